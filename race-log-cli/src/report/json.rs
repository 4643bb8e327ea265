//! JSON results report

use anyhow::{Context, Result};
use race_log_decoder::{format_duration, CompetitorResult, Split, Status};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecord {
    competitor: u32,
    status: &'static str,
    elapsed: Option<String>,
    laps_completed: u32,
    laps: Vec<SplitRecord>,
    penalties: Vec<SplitRecord>,
    hits: u32,
    hit_capacity: u32,
}

#[derive(Debug, Serialize)]
struct SplitRecord {
    time: String,
    /// `null` when the split has no positive duration
    speed: Option<f64>,
}

impl From<&Split> for SplitRecord {
    fn from(split: &Split) -> Self {
        Self {
            time: format_duration(split.duration),
            speed: split.speed.value(),
        }
    }
}

impl From<&CompetitorResult> for ResultRecord {
    fn from(result: &CompetitorResult) -> Self {
        let (status, elapsed) = match result.status {
            Status::Finished { elapsed } => ("Finished", Some(format_duration(elapsed))),
            Status::NotFinished => ("NotFinished", None),
            Status::NotStarted => ("NotStarted", None),
            Status::Unknown => ("Unknown", None),
        };
        Self {
            competitor: result.competitor,
            status,
            elapsed,
            laps_completed: result.laps_completed,
            laps: result.laps.iter().map(SplitRecord::from).collect(),
            penalties: result.penalties.iter().map(SplitRecord::from).collect(),
            hits: result.hits,
            hit_capacity: result.hit_capacity,
        }
    }
}

/// Render results as a pretty-printed JSON array
pub fn render(results: &[CompetitorResult]) -> Result<String> {
    let records: Vec<ResultRecord> = results.iter().map(ResultRecord::from).collect();
    serde_json::to_string_pretty(&records).context("Failed to serialize results")
}
