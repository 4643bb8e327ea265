//! Report generation
//!
//! Renders finalized results as a plain-text block or as JSON.

pub mod json;
pub mod txt;

use anyhow::Result;
use race_log_decoder::CompetitorResult;

/// Output format for the final results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render the final results block in the requested format
pub fn render(results: &[CompetitorResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(txt::render(results)),
        OutputFormat::Json => json::render(results),
    }
}
