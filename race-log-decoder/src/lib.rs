//! Race Log Decoder Library
//!
//! Reconstructs results of a timed multi-lap race (laps, firing ranges,
//! penalty laps) from a chronologically ordered log of discrete events.
//!
//! # Architecture
//!
//! - `formats` tokenizes the textual log into `Event` values and sorts them
//! - `state_machine` applies events one by one to the `registry`
//! - `results` projects the final registry onto per-competitor results
//! - `decoder` ties these together behind `RaceDecoder`
//!
//! The library does NOT render reports or read configuration files; that is
//! the application layer (race-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use race_log_decoder::{RaceConfig, RaceDecoder};
//! use std::path::Path;
//!
//! let config = RaceConfig::new(2, 3651.0, 50.0, 1, "09:30:00.000", "00:00:30").unwrap();
//! let decoder = RaceDecoder::new(config);
//!
//! let outcome = decoder
//!     .decode_file(Path::new("events"), |line| println!("{}", line))
//!     .unwrap();
//!
//! for result in &outcome.results {
//!     println!("{} competitor {}", result.status, result.competitor);
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod formats;
pub mod registry;
pub mod results;
pub mod state_machine;
pub mod types;

// Re-export main types for convenience
pub use config::{parse_start_delta, RaceConfig, RaceConfigFile, RegistrationPolicy};
pub use decoder::{RaceDecoder, RaceOutcome};
pub use formats::{parse_event_line, read_event_file, sort_events};
pub use registry::{CompetitorRecord, CompetitorRegistry, Phase};
pub use results::{finalize, CompetitorResult, Speed, Split, Status};
pub use state_machine::{Narration, RaceStateMachine};
pub use types::{
    format_duration, parse_timestamp, DecoderError, Duration, Event, EventKind, Result,
    Timestamp, TIME_FORMAT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
