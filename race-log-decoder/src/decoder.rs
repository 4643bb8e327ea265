//! Main decoder API
//!
//! `RaceDecoder` is the entry point: it owns the race configuration, sorts a
//! batch of events, drives the state machine over them and finalizes the
//! registry into results.

use crate::config::RaceConfig;
use crate::formats::{read_event_file, sort_events};
use crate::registry::CompetitorRegistry;
use crate::results::{finalize, CompetitorResult};
use crate::state_machine::{Narration, RaceStateMachine};
use crate::types::{Event, Result};
use std::path::Path;

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    /// Narration lines in processing order
    pub narrations: Vec<Narration>,
    /// Finalized results in registration order
    pub results: Vec<CompetitorResult>,
    /// Final registry state
    pub registry: CompetitorRegistry,
    /// Events with an unknown kind that were skipped
    pub skipped_events: usize,
}

/// The main decoder struct - entry point for race reconstruction
pub struct RaceDecoder {
    config: RaceConfig,
}

impl RaceDecoder {
    pub fn new(config: RaceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Read, sort and process an event log file
    ///
    /// Any read or parse failure aborts before a single event is applied.
    pub fn decode_file<F>(&self, path: &Path, on_narration: F) -> Result<RaceOutcome>
    where
        F: FnMut(&Narration),
    {
        let mut events = read_event_file(path)?;
        sort_events(&mut events);
        self.process_with(&events, on_narration)
    }

    /// Process already-sorted events, collecting narration
    pub fn process(&self, events: &[Event]) -> Result<RaceOutcome> {
        self.process_with(events, |_| {})
    }

    /// Process already-sorted events, handing each narration line to `on_narration`
    /// as soon as its event has been applied
    pub fn process_with<F>(&self, events: &[Event], mut on_narration: F) -> Result<RaceOutcome>
    where
        F: FnMut(&Narration),
    {
        log::info!("Processing {} events", events.len());

        let mut machine = RaceStateMachine::new();
        let mut registry = CompetitorRegistry::new();
        let mut narrations = Vec::with_capacity(events.len());
        let mut skipped_events = 0;

        for event in events {
            let lines = machine.apply(&mut registry, &self.config, event)?;
            if lines.is_empty() {
                skipped_events += 1;
            }
            for line in &lines {
                on_narration(line);
            }
            narrations.extend(lines);
        }

        let results = finalize(&registry, &self.config);
        log::info!(
            "Finalized {} competitors ({} events skipped)",
            results.len(),
            skipped_events
        );

        Ok(RaceOutcome {
            narrations,
            results,
            registry,
            skipped_events,
        })
    }
}
