//! Race configuration types
//!
//! `RaceConfigFile` mirrors the on-disk record field for field (camelCase keys,
//! raw time strings). It is converted into the validated, immutable
//! `RaceConfig` value object that the state machine and finalizer consume.

use crate::types::{parse_timestamp, DecoderError, Duration, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// Shots per lap used for the hit capacity display value
pub const SHOTS_PER_LAP: u32 = 5;

/// Largest lap count whose hit capacity still fits in a `u32`
pub const MAX_LAPS: u32 = u32::MAX / SHOTS_PER_LAP;

/// Raw configuration record as stored in `config.json` / `config.toml`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfigFile {
    pub laps: u32,
    pub lap_len: u32,
    pub penalty_len: u32,
    pub firing_lines: u32,
    pub start: String,
    pub start_delta: String,
}

/// What to do when a competitor is registered a second time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Reset the existing record in place (reference behaviour)
    #[default]
    Overwrite,
    /// Fail with `DuplicateRegistration`
    Reject,
}

/// Validated race configuration, immutable for the run
#[derive(Debug, Clone, PartialEq)]
pub struct RaceConfig {
    /// Number of main laps
    pub laps: u32,
    /// Main lap length in distance units
    pub lap_length: f64,
    /// Penalty lap length in distance units
    pub penalty_length: f64,
    /// Number of firing lines
    pub firing_lines: u32,
    /// Scheduled race start
    pub start: Timestamp,
    /// Maximum gap between successive scheduled starts, and the late-start grace window
    pub start_interval: Duration,
    /// Re-registration handling
    pub registration: RegistrationPolicy,
}

impl RaceConfig {
    /// Create a configuration from raw values, validating them
    pub fn new(
        laps: u32,
        lap_length: f64,
        penalty_length: f64,
        firing_lines: u32,
        start: &str,
        start_delta: &str,
    ) -> Result<Self> {
        let config = Self {
            laps,
            lap_length,
            penalty_length,
            firing_lines,
            start: parse_timestamp(start)?,
            start_interval: parse_start_delta(start_delta)?,
            registration: RegistrationPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder method: set the re-registration policy
    pub fn with_registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.registration = policy;
        self
    }

    /// Hit display capacity (`laps * 5`), independent of shots actually fired
    pub fn hit_capacity(&self) -> u32 {
        self.laps.saturating_mul(SHOTS_PER_LAP)
    }

    /// Check that all counts and lengths are positive and in range
    pub fn validate(&self) -> Result<()> {
        if self.laps == 0 {
            return Err(DecoderError::ConfigError("laps must be positive".to_string()));
        }
        if self.laps > MAX_LAPS {
            return Err(DecoderError::ConfigError(format!(
                "laps must not exceed {}",
                MAX_LAPS
            )));
        }
        if self.firing_lines == 0 {
            return Err(DecoderError::ConfigError(
                "firingLines must be positive".to_string(),
            ));
        }
        if !(self.lap_length > 0.0) {
            return Err(DecoderError::ConfigError("lapLen must be positive".to_string()));
        }
        if !(self.penalty_length > 0.0) {
            return Err(DecoderError::ConfigError(
                "penaltyLen must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<RaceConfigFile> for RaceConfig {
    type Error = DecoderError;

    fn try_from(file: RaceConfigFile) -> Result<Self> {
        RaceConfig::new(
            file.laps,
            f64::from(file.lap_len),
            f64::from(file.penalty_len),
            file.firing_lines,
            &file.start,
            &file.start_delta,
        )
    }
}

/// Parse a start interval of the form `HH:MM:SS[.mmm]` as a duration
///
/// The fraction may have one to three digits and is read as a decimal fraction
/// of a second (`.5` is 500 ms).
pub fn parse_start_delta(text: &str) -> Result<Duration> {
    let fail = || DecoderError::DeltaParseError(text.to_string());

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(fail());
    }

    let (seconds, fraction) = match parts[2].split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (parts[2], None),
    };

    let hours = parse_digits(parts[0]).ok_or_else(fail)?;
    let minutes = parse_digits(parts[1]).ok_or_else(fail)?;
    let seconds = parse_digits(seconds).ok_or_else(fail)?;
    let millis = match fraction {
        None => 0,
        Some(f) if (1..=3).contains(&f.len()) => {
            let value = parse_digits(f).ok_or_else(fail)?;
            value * 10_i64.pow(3 - f.len() as u32)
        }
        Some(_) => return Err(fail()),
    };

    let total_ms = ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis;
    Duration::try_milliseconds(total_ms).ok_or_else(fail)
}

fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
