//! Core types for the race log decoder library
//!
//! This module defines the fundamental types shared by the tokenizer, the race
//! state machine and the result finalizer: time-of-day timestamps, the event
//! model and the error taxonomy.

use chrono::{NaiveTime, TimeDelta};
use std::fmt;

/// Time-of-day timestamp used throughout the decoder (millisecond precision)
pub type Timestamp = NaiveTime;

/// Signed duration between two timestamps
pub type Duration = TimeDelta;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// `HH:MM:SS.mmm` layout used by event lines, start times and the report
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Errors that can occur while decoding a race log
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to parse event line {line}: {reason}")]
    EventParseError { line: usize, reason: String },

    #[error("Invalid time of day: {0:?}")]
    TimeParseError(String),

    #[error("Invalid start interval: {0:?}")]
    DeltaParseError(String),

    #[error("Unknown event kind {0}, expected a value in [1, 11]")]
    UnknownEventKind(u64),

    #[error("Event {event} references unregistered competitor {competitor}")]
    UnregisteredCompetitor { competitor: u32, event: EventKind },

    #[error("Competitor {competitor} left the penalty laps without entering them")]
    MissingPenaltySegmentStart { competitor: u32 },

    #[error("Competitor {0} is already registered")]
    DuplicateRegistration(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The eleven recognised event kinds, numbered as they appear in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Register = 1,
    AssignedStartTime = 2,
    OnStartLine = 3,
    ActuallyStarted = 4,
    OnFiringRange = 5,
    Hit = 6,
    LeftFiringRange = 7,
    EnteredPenaltyLaps = 8,
    LeftPenaltyLaps = 9,
    EndedMainLap = 10,
    Withdrawal = 11,
}

impl EventKind {
    /// Numeric identifier used in the log grammar
    pub fn id(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u64> for EventKind {
    type Error = DecoderError;

    fn try_from(id: u64) -> Result<Self> {
        let kind = match id {
            1 => EventKind::Register,
            2 => EventKind::AssignedStartTime,
            3 => EventKind::OnStartLine,
            4 => EventKind::ActuallyStarted,
            5 => EventKind::OnFiringRange,
            6 => EventKind::Hit,
            7 => EventKind::LeftFiringRange,
            8 => EventKind::EnteredPenaltyLaps,
            9 => EventKind::LeftPenaltyLaps,
            10 => EventKind::EndedMainLap,
            11 => EventKind::Withdrawal,
            other => return Err(DecoderError::UnknownEventKind(other)),
        };
        Ok(kind)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Register => "Register",
            EventKind::AssignedStartTime => "AssignedStartTime",
            EventKind::OnStartLine => "OnStartLine",
            EventKind::ActuallyStarted => "ActuallyStarted",
            EventKind::OnFiringRange => "OnFiringRange",
            EventKind::Hit => "Hit",
            EventKind::LeftFiringRange => "LeftFiringRange",
            EventKind::EnteredPenaltyLaps => "EnteredPenaltyLaps",
            EventKind::LeftPenaltyLaps => "LeftPenaltyLaps",
            EventKind::EndedMainLap => "EndedMainLap",
            EventKind::Withdrawal => "Withdrawal",
        };
        write!(f, "{}({})", name, self.id())
    }
}

/// A single structured event from the race log
///
/// The kind is kept as the raw number from the log so that unknown kinds can
/// travel through sorting and be reported by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Parsed time of day
    pub time: Timestamp,
    /// Timestamp text exactly as it appeared in the log
    pub raw_time: String,
    /// Numeric event kind, wide enough to carry any all-digit token
    pub kind_id: u64,
    /// Competitor the event refers to
    pub competitor: u32,
    /// Free-text remainder of the line (range id, target id, start time, reason)
    pub payload: Option<String>,
}

impl Event {
    /// Build an event, parsing the timestamp text
    pub fn new(
        raw_time: &str,
        kind: EventKind,
        competitor: u32,
        payload: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            time: parse_timestamp(raw_time)?,
            raw_time: raw_time.to_string(),
            kind_id: u64::from(kind.id()),
            competitor,
            payload: payload.map(str::to_string),
        })
    }

    /// Decode the numeric kind
    pub fn kind(&self) -> Result<EventKind> {
        EventKind::try_from(self.kind_id)
    }

    /// Payload text, empty when absent
    pub fn payload_str(&self) -> &str {
        self.payload.as_deref().unwrap_or("")
    }
}

/// Parse a strict `HH:MM:SS.mmm` time of day
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 12
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes[8] == b'.'
        && [0, 1, 3, 4, 6, 7, 9, 10, 11]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit());
    if !well_formed {
        return Err(DecoderError::TimeParseError(text.to_string()));
    }

    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|_| DecoderError::TimeParseError(text.to_string()))
}

/// Render a duration as `HH:MM:SS.mmm`; hours are not wrapped at 24
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let ms = total_ms.unsigned_abs();
    format!(
        "{}{:02}:{:02}:{:02}.{:03}",
        sign,
        ms / 3_600_000,
        (ms / 60_000) % 60,
        (ms / 1000) % 60,
        ms % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_ids() {
        for id in 1..=11u32 {
            let kind = EventKind::try_from(u64::from(id)).unwrap();
            assert_eq!(kind.id(), id);
        }
        assert!(matches!(
            EventKind::try_from(0),
            Err(DecoderError::UnknownEventKind(0))
        ));
        assert!(matches!(
            EventKind::try_from(12),
            Err(DecoderError::UnknownEventKind(12))
        ));
        assert!(matches!(
            EventKind::try_from(4_294_967_296),
            Err(DecoderError::UnknownEventKind(4_294_967_296))
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        let t = parse_timestamp("09:30:01.005").unwrap();
        assert_eq!(t, NaiveTime::from_hms_milli_opt(9, 30, 1, 5).unwrap());

        assert!(parse_timestamp("09:30:bad").is_err());
        assert!(parse_timestamp("9:30:01.005").is_err());
        assert!(parse_timestamp("09:30:01").is_err());
        assert!(parse_timestamp("25:00:00.000").is_err());
        assert!(parse_timestamp("09:30:01.0050").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::minutes(10)), "00:10:00.000");
        assert_eq!(
            format_duration(TimeDelta::milliseconds(29 * 60_000 + 3_872)),
            "00:29:03.872"
        );
        assert_eq!(format_duration(TimeDelta::hours(26)), "26:00:00.000");
        assert_eq!(format_duration(TimeDelta::milliseconds(-1500)), "-00:00:01.500");
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Withdrawal.to_string(), "Withdrawal(11)");
    }
}
