//! Result finalizer
//!
//! Projects the final registry state onto reported results. The status uses a
//! fixed precedence over the record flags:
//!
//! 1. not finished: no finish time, disqualified, or lap count differs from the race
//! 2. not started: draw gap or late start
//! 3. finished: actually started; elapsed is finish minus scheduled start
//! 4. unknown: anything else

use crate::config::RaceConfig;
use crate::registry::{CompetitorRecord, CompetitorRegistry, Phase};
use crate::types::{format_duration, Duration};
use std::fmt;

/// Reported competitor status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Finished { elapsed: Duration },
    NotFinished,
    NotStarted,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Finished { elapsed } => write!(f, "[{}]", format_duration(*elapsed)),
            Status::NotFinished => write!(f, "[NotFinished]"),
            Status::NotStarted => write!(f, "[NotStarted]"),
            Status::Unknown => write!(f, "[Unknown]"),
        }
    }
}

/// Average speed over a split, in distance units per second
///
/// Splits of zero (or negative) length have no meaningful speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Speed {
    Defined(f64),
    Undefined,
}

impl Speed {
    pub fn over(distance: f64, duration: Duration) -> Self {
        let millis = duration.num_milliseconds();
        if millis <= 0 {
            return Speed::Undefined;
        }
        Speed::Defined(distance * 1000.0 / millis as f64)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Speed::Defined(v) => Some(v),
            Speed::Undefined => None,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speed::Defined(v) => write!(f, "{:.3}", v),
            Speed::Undefined => write!(f, "undefined"),
        }
    }
}

/// A timed segment with its average speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub duration: Duration,
    pub speed: Speed,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", format_duration(self.duration), self.speed)
    }
}

/// Finalized result for one competitor
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorResult {
    pub competitor: u32,
    pub status: Status,
    pub phase: Phase,
    pub laps_completed: u32,
    pub laps: Vec<Split>,
    pub penalties: Vec<Split>,
    pub hits: u32,
    pub hit_capacity: u32,
}

/// Derive the reported status of one record
pub fn status_of(record: &CompetitorRecord, config: &RaceConfig) -> Status {
    let finish = match record.finish_time {
        Some(finish) if !record.disqualified && record.laps_completed == config.laps => finish,
        _ => return Status::NotFinished,
    };
    if record.not_started {
        return Status::NotStarted;
    }
    match (record.started, record.scheduled_start) {
        (true, Some(scheduled)) => Status::Finished {
            elapsed: finish.signed_duration_since(scheduled),
        },
        _ => Status::Unknown,
    }
}

/// Finalize a single record
pub fn finalize_record(record: &CompetitorRecord, config: &RaceConfig) -> CompetitorResult {
    let splits = |durations: &[Duration], distance: f64| -> Vec<Split> {
        durations
            .iter()
            .map(|&duration| Split {
                duration,
                speed: Speed::over(distance, duration),
            })
            .collect()
    };

    CompetitorResult {
        competitor: record.id,
        status: status_of(record, config),
        phase: record.phase,
        laps_completed: record.laps_completed,
        laps: splits(&record.lap_durations, config.lap_length),
        penalties: splits(&record.penalty_durations, config.penalty_length),
        hits: record.hits,
        hit_capacity: config.hit_capacity(),
    }
}

/// Finalize every record, in registration order
pub fn finalize(registry: &CompetitorRegistry, config: &RaceConfig) -> Vec<CompetitorResult> {
    registry
        .iter()
        .map(|record| finalize_record(record, config))
        .collect()
}
