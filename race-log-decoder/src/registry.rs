//! Competitor registry
//!
//! Records live in a dense arena (`Vec`) in registration order, with a map from
//! competitor id to arena index. The state machine holds the only mutable
//! borrow while events are applied; the finalizer reads it afterwards.

use crate::types::{Duration, Timestamp};
use std::collections::HashMap;

/// Lifecycle tag of a competitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Registered, not yet seen on course
    #[default]
    Registered,
    /// Actual start observed
    Started,
    /// Completed the configured number of main laps
    Finished,
    /// Start rules violated (draw gap or late start); sticky
    DidNotStart,
    /// Withdrew; terminal
    Disqualified,
}

impl Phase {
    /// Move to `next` unless the current phase is terminal or sticky
    ///
    /// Disqualified dominates everything; DidNotStart only yields to Disqualified.
    pub fn advance(self, next: Phase) -> Phase {
        match (self, next) {
            (Phase::Disqualified, _) => Phase::Disqualified,
            (Phase::DidNotStart, Phase::Disqualified) => Phase::Disqualified,
            (Phase::DidNotStart, _) => Phase::DidNotStart,
            (_, next) => next,
        }
    }
}

/// Mutable per-competitor state accumulated from events
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorRecord {
    pub id: u32,
    pub phase: Phase,
    pub started: bool,
    pub laps_completed: u32,
    pub hits: u32,
    /// Set once, never cleared
    pub disqualified: bool,
    /// Scheduled-start gap or late actual start
    pub not_started: bool,
    pub scheduled_start: Option<Timestamp>,
    pub finish_time: Option<Timestamp>,
    pub penalty_segment_start: Option<Timestamp>,
    /// Append-only
    pub lap_durations: Vec<Duration>,
    /// Append-only
    pub penalty_durations: Vec<Duration>,
}

impl CompetitorRecord {
    /// Fresh zero-valued record
    pub fn new(id: u32) -> Self {
        Self {
            id,
            phase: Phase::Registered,
            started: false,
            laps_completed: 0,
            hits: 0,
            disqualified: false,
            not_started: false,
            scheduled_start: None,
            finish_time: None,
            penalty_segment_start: None,
            lap_durations: Vec::new(),
            penalty_durations: Vec::new(),
        }
    }
}

/// Registry of competitor records keyed by id
#[derive(Debug, Clone, Default)]
pub struct CompetitorRegistry {
    records: Vec<CompetitorRecord>,
    index: HashMap<u32, usize>,
}

impl CompetitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record, or reset an existing one in place
    ///
    /// Returns `true` if the id was already registered.
    pub fn register(&mut self, id: u32) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.records[slot] = CompetitorRecord::new(id);
                true
            }
            None => {
                self.index.insert(id, self.records.len());
                self.records.push(CompetitorRecord::new(id));
                false
            }
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<&CompetitorRecord> {
        self.index.get(&id).map(|&slot| &self.records[slot])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut CompetitorRecord> {
        self.index.get(&id).map(|&slot| &mut self.records[slot])
    }

    /// Records in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CompetitorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
