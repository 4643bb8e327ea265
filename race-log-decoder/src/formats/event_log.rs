//! Textual race event log parser
//!
//! Each line has the form
//!
//! ```text
//! [HH:MM:SS.mmm] <eventKind> <competitorId>[ <payload>]
//! ```
//!
//! The timestamp is fixed width, kind and competitor are decimal integers
//! separated by single spaces, and everything after the next space is the
//! payload. Blank lines are skipped; anything else that does not match is an
//! error carrying the 1-based line number.

use crate::types::{parse_timestamp, DecoderError, Event, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const TIMESTAMP_WIDTH: usize = 12;

/// Race event log parser
pub struct EventLogParser;

impl EventLogParser {
    /// Open an event log and return an iterator over its events
    pub fn parse(path: &Path) -> Result<EventLogIterator<BufReader<File>>> {
        log::info!("Parsing event log: {:?}", path);

        let file = File::open(path)?;
        Ok(EventLogIterator::from_reader(BufReader::new(file)))
    }
}

/// Iterator over events read line by line from any buffered reader
pub struct EventLogIterator<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> EventLogIterator<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventLogIterator<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                log::trace!("Skipping blank line {}", self.line_no);
                continue;
            }
            return Some(parse_event_line(&line, self.line_no));
        }
    }
}

/// Parse one event line; `line_no` is only used for error reporting
pub fn parse_event_line(text: &str, line_no: usize) -> Result<Event> {
    let fail = |reason: &str| DecoderError::EventParseError {
        line: line_no,
        reason: reason.to_string(),
    };

    let text = text.trim_end();
    let rest = text
        .strip_prefix('[')
        .ok_or_else(|| fail("timestamp must be enclosed in brackets"))?;

    let raw_time = rest
        .get(..TIMESTAMP_WIDTH)
        .ok_or_else(|| fail("truncated timestamp"))?;
    let rest = rest[TIMESTAMP_WIDTH..]
        .strip_prefix("] ")
        .ok_or_else(|| fail("expected \"] \" after timestamp"))?;
    let time = parse_timestamp(raw_time).map_err(|_| fail("malformed timestamp"))?;

    let mut fields = rest.splitn(3, ' ');
    let kind_id = fields
        .next()
        .and_then(parse_kind)
        .ok_or_else(|| fail("event kind must be a non-negative integer"))?;
    let competitor = fields
        .next()
        .and_then(parse_decimal)
        .ok_or_else(|| fail("competitor id must be a non-negative integer"))?;
    let payload = fields.next().map(str::to_string);

    log::trace!(
        "Line {}: [{}] kind={} competitor={} payload={:?}",
        line_no,
        raw_time,
        kind_id,
        competitor,
        payload
    );

    Ok(Event {
        time,
        raw_time: raw_time.to_string(),
        kind_id,
        competitor,
        payload,
    })
}

fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_decimal(text: &str) -> Option<u32> {
    is_decimal(text).then(|| text.parse().ok()).flatten()
}

/// Any all-digit kind is well formed; values past `u64` saturate and are
/// later reported as unknown
fn parse_kind(text: &str) -> Option<u64> {
    is_decimal(text).then(|| text.parse().unwrap_or(u64::MAX))
}

/// Read and parse a whole event log, failing on the first malformed line
pub fn read_event_file(path: &Path) -> Result<Vec<Event>> {
    let events = EventLogParser::parse(path)?.collect::<Result<Vec<_>>>()?;
    log::info!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}

/// Stable sort by timestamp; events with equal timestamps keep input order
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|event| event.time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::io::Cursor;

    #[test]
    fn test_parse_valid_line() {
        let event = parse_event_line("[09:30:01.005] 4 1", 1).unwrap();
        assert_eq!(event.kind_id, 4);
        assert_eq!(event.competitor, 1);
        assert_eq!(event.raw_time, "09:30:01.005");
        assert_eq!(event.time, NaiveTime::from_hms_milli_opt(9, 30, 1, 5).unwrap());
        assert_eq!(event.payload, None);
    }

    #[test]
    fn test_parse_payload_keeps_remainder() {
        let event = parse_event_line("[12:34:56.789] 5 10 extra params", 1).unwrap();
        assert_eq!(event.raw_time, "12:34:56.789");
        assert_eq!(event.kind_id, 5);
        assert_eq!(event.competitor, 10);
        assert_eq!(event.payload.as_deref(), Some("extra params"));

        let event = parse_event_line("[09:59:45.000] 11 3 Lost in the forest\r", 1).unwrap();
        assert_eq!(event.payload.as_deref(), Some("Lost in the forest"));
    }

    #[test]
    fn test_parse_oversized_kind() {
        let event = parse_event_line("[09:00:00.000] 4294967296 1", 1).unwrap();
        assert_eq!(event.kind_id, 4_294_967_296);
        assert!(matches!(
            event.kind(),
            Err(DecoderError::UnknownEventKind(4_294_967_296))
        ));

        let event = parse_event_line("[09:00:00.000] 99999999999999999999999 1", 1).unwrap();
        assert_eq!(event.kind_id, u64::MAX);

        assert!(parse_event_line("[09:00:00.000] 1 4294967296", 1).is_err());
    }

    #[test]
    fn test_parse_malformed_lines() {
        for bad in [
            "hello bad 1",
            "09:30:00.000 4 1",
            "[09:30:bad] 4 1",
            "[09:30:01.005]4 1",
            "[09:30:01.005] x 1",
            "[09:30:01.005] 4",
            "[09:30:01.005] 4 -1",
            "[09:30:01.005]",
            "[",
        ] {
            let result = parse_event_line(bad, 7);
            assert!(
                matches!(result, Err(DecoderError::EventParseError { line: 7, .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_iterator_skips_blank_lines_and_reports_line_numbers() {
        let input = "[09:05:59.867] 1 1\n\n[09:15:00.841] 2 1 09:30:00.000\nbroken\n";
        let results: Vec<_> = EventLogIterator::from_reader(Cursor::new(input)).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap().payload.as_deref(),
            Some("09:30:00.000")
        );
        assert!(matches!(
            results[2],
            Err(DecoderError::EventParseError { line: 4, .. })
        ));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut events = vec![
            parse_event_line("[10:00:02.000] 1 3", 1).unwrap(),
            parse_event_line("[10:00:01.000] 1 1", 2).unwrap(),
            parse_event_line("[10:00:02.000] 1 2", 3).unwrap(),
            parse_event_line("[10:00:01.000] 1 4", 4).unwrap(),
        ];
        sort_events(&mut events);
        let order: Vec<u32> = events.iter().map(|e| e.competitor).collect();
        assert_eq!(order, vec![1, 4, 3, 2]);
    }

    #[test]
    fn test_event_log_file_not_found() {
        let result = EventLogParser::parse(Path::new("nonexistent.events"));
        assert!(matches!(result, Err(DecoderError::IoError(_))));
    }
}
