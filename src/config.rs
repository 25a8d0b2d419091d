//! Run configuration.
//!
//! Loaded from YAML or JSON (picked by file extension) and then overridden
//! by command-line flags.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Result, VerityError};

/// How compound output assertions are settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Compare captured blocks immediately and record pass or fail.
    #[default]
    Compare,
    /// Emit both blocks to the comments channel for an external diff and
    /// record the assertion as output-to-css.
    Emit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunConfig {
    /// Turn failing tests into a fatal error at the end of the run.
    pub fail_on_error: bool,
    /// Mirror results and the summary onto the terminal-only debug channel.
    pub terminal: bool,
    /// Multi-line summary instead of a single line.
    pub verbose: bool,
    pub output_mode: OutputMode,
    pub color: ColorMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_on_error: false,
            terminal: true,
            verbose: true,
            output_mode: OutputMode::Compare,
            color: ColorMode::Auto,
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| VerityError::Config {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| VerityError::Config {
            message: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| VerityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn defers_output(&self) -> bool {
        self.output_mode == OutputMode::Emit
    }
}
