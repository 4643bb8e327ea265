//! Race state machine
//!
//! Applies events one at a time, in order, to the competitor registry. Each
//! applied event yields zero or more narration lines for the audit trail.
//! The only registry-wide state is the most recently assigned start time,
//! which is the baseline for validating the next draw.

use crate::config::{RaceConfig, RegistrationPolicy};
use crate::registry::{CompetitorRecord, CompetitorRegistry, Phase};
use crate::types::{
    format_duration, parse_timestamp, DecoderError, Event, EventKind, Result, Timestamp,
    TIME_FORMAT,
};
use std::fmt;

/// One audit line produced while applying an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// Timestamp text exactly as it appeared in the log
    pub raw_time: String,
    pub competitor: u32,
    pub message: String,
}

impl Narration {
    fn new(event: &Event, message: String) -> Self {
        Self {
            raw_time: event.raw_time.clone(),
            competitor: event.competitor,
            message,
        }
    }
}

impl fmt::Display for Narration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.raw_time, self.message)
    }
}

/// Sequential event interpreter
#[derive(Debug, Clone, Default)]
pub struct RaceStateMachine {
    last_assigned_start: Option<Timestamp>,
}

impl RaceStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single event
    ///
    /// Unknown event kinds are logged and skipped with no narration and no
    /// registry change. Unregistered competitors, a penalty exit without an
    /// entry, an unparsable start time and (when rejected) a repeated
    /// registration are returned as errors.
    pub fn apply(
        &mut self,
        registry: &mut CompetitorRegistry,
        config: &RaceConfig,
        event: &Event,
    ) -> Result<Vec<Narration>> {
        let kind = match event.kind() {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!(
                    "[{}] {} (competitor {}), skipping",
                    event.raw_time,
                    e,
                    event.competitor
                );
                return Ok(Vec::new());
            }
        };
        log::debug!("[{}] {} competitor={}", event.raw_time, kind, event.competitor);

        let id = event.competitor;
        let lines = match kind {
            EventKind::Register => self.register(registry, config, event)?,
            EventKind::AssignedStartTime => {
                let record = lookup(registry, event, kind)?;
                let scheduled = parse_timestamp(event.payload_str().trim())?;
                let baseline = self.last_assigned_start.unwrap_or(config.start);
                if scheduled.signed_duration_since(baseline) > config.start_interval {
                    log::debug!(
                        "Competitor {} drawn at {} more than {} after {}",
                        id,
                        scheduled,
                        format_duration(config.start_interval),
                        baseline
                    );
                    mark_not_started(record);
                }
                if record.scheduled_start.is_some() {
                    log::warn!("Competitor {} start time reassigned", id);
                }
                record.scheduled_start = Some(scheduled);
                self.last_assigned_start = Some(scheduled);

                vec![format!(
                    "The start time for the competitor({}) was set by a draw to {}",
                    id,
                    scheduled.format(TIME_FORMAT)
                )]
            }
            EventKind::OnStartLine => {
                lookup(registry, event, kind)?;
                vec![format!("The competitor({}) is on the start line", id)]
            }
            EventKind::ActuallyStarted => {
                let record = lookup(registry, event, kind)?;
                let scheduled = record.scheduled_start.unwrap_or_else(|| {
                    log::warn!(
                        "Competitor {} started without a drawn start time, using race start {}",
                        id,
                        config.start
                    );
                    config.start
                });
                let mut lines = Vec::new();
                if event.time.signed_duration_since(scheduled) > config.start_interval {
                    mark_not_started(record);
                    lines.push(format!("The competitor({}) is disqualified for late start", id));
                }
                record.started = true;
                record.phase = record.phase.advance(Phase::Started);
                lines.push(format!("The competitor({}) has started", id));
                lines
            }
            EventKind::OnFiringRange => {
                lookup(registry, event, kind)?;
                vec![format!(
                    "The competitor({}) is on the firing range ({})",
                    id,
                    event.payload_str()
                )]
            }
            EventKind::Hit => {
                let record = lookup(registry, event, kind)?;
                record.hits += 1;
                vec![format!(
                    "The target has been hit ({}) by competitor({})",
                    event.payload_str(),
                    id
                )]
            }
            EventKind::LeftFiringRange => {
                lookup(registry, event, kind)?;
                vec![format!("The competitor({}) left the firing range", id)]
            }
            EventKind::EnteredPenaltyLaps => {
                let record = lookup(registry, event, kind)?;
                record.penalty_segment_start = Some(event.time);
                vec![format!("The competitor({}) entered the penalty laps", id)]
            }
            EventKind::LeftPenaltyLaps => {
                let record = lookup(registry, event, kind)?;
                let entered = record
                    .penalty_segment_start
                    .ok_or(DecoderError::MissingPenaltySegmentStart { competitor: id })?;
                record
                    .penalty_durations
                    .push(event.time.signed_duration_since(entered));
                vec![format!("The competitor({}) left the penalty laps", id)]
            }
            EventKind::EndedMainLap => {
                let record = lookup(registry, event, kind)?;
                record.laps_completed += 1;
                // Only one aggregate split is recorded, when the last lap ends
                if record.lap_durations.is_empty() && record.laps_completed == config.laps {
                    record_split(record, event, kind);
                }
                if record.laps_completed == config.laps {
                    record.phase = record.phase.advance(Phase::Finished);
                }
                record.finish_time = Some(event.time);
                vec![format!("The competitor({}) ended the main lap", id)]
            }
            EventKind::Withdrawal => {
                let record = lookup(registry, event, kind)?;
                if record.laps_completed < config.laps {
                    record_split(record, event, kind);
                }
                record.disqualified = true;
                record.phase = record.phase.advance(Phase::Disqualified);
                vec![format!(
                    "The competitor({}) can`t continue: {}",
                    id,
                    event.payload_str()
                )]
            }
        };

        Ok(lines
            .into_iter()
            .map(|message| Narration::new(event, message))
            .collect())
    }

    fn register(
        &mut self,
        registry: &mut CompetitorRegistry,
        config: &RaceConfig,
        event: &Event,
    ) -> Result<Vec<String>> {
        let id = event.competitor;
        if config.registration == RegistrationPolicy::Reject && registry.contains(id) {
            return Err(DecoderError::DuplicateRegistration(id));
        }
        if registry.register(id) {
            log::warn!("Competitor {} registered again, previous record discarded", id);
        }
        Ok(vec![format!("The competitor({}) registered", id)])
    }
}

fn lookup<'r>(
    registry: &'r mut CompetitorRegistry,
    event: &Event,
    kind: EventKind,
) -> Result<&'r mut CompetitorRecord> {
    registry
        .get_mut(event.competitor)
        .ok_or(DecoderError::UnregisteredCompetitor {
            competitor: event.competitor,
            event: kind,
        })
}

fn mark_not_started(record: &mut CompetitorRecord) {
    record.not_started = true;
    record.phase = record.phase.advance(Phase::DidNotStart);
}

/// Append a lap split measured from the scheduled start; skipped without a draw
fn record_split(record: &mut CompetitorRecord, event: &Event, kind: EventKind) {
    match record.scheduled_start {
        Some(scheduled) => record
            .lap_durations
            .push(event.time.signed_duration_since(scheduled)),
        None => log::warn!(
            "[{}] {} for competitor {} has no drawn start time, lap split skipped",
            event.raw_time,
            kind,
            record.id
        ),
    }
}
