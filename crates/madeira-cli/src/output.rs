//! Output rendering shared by every subcommand.

use std::fmt;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

impl OutputFormat {
    /// Render `output` in this format.
    pub fn render_to_string<T: Serialize + fmt::Display>(&self, output: &T) -> Result<String> {
        match self {
            OutputFormat::Text => Ok(output.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
        }
    }

    /// Render `output` to stdout.
    pub fn render<T: Serialize + fmt::Display>(&self, output: &T) -> Result<()> {
        println!("{}", self.render_to_string(output)?);
        Ok(())
    }
}
