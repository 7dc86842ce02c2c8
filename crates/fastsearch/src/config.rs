//! Search session options.
//!
//! Options can be built in code or loaded from a JSON file. Every field has
//! a default, so a partial file (or `{}`) is valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Number of partitioning generations before falling back to a sequential walk.
pub const DEFAULT_FAN_OUT_DEPTH: usize = 2;

/// Where subscriber callbacks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteHandlers {
    /// On the worker that produced the batch, before it continues.
    #[default]
    Inline,
    /// As a separately scheduled pool job, joined before completion.
    Deferred,
}

impl ExecuteHandlers {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Deferred => "deferred",
        }
    }
}

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub execute_handlers: ExecuteHandlers,
    /// When true, a cancelled `start_search` returns normally after the
    /// completion notification instead of returning `SearchError::Cancelled`.
    pub suppress_cancellation: bool,
    pub fan_out_depth: usize,
    /// Case sensitivity of pattern filters.
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            execute_handlers: ExecuteHandlers::default(),
            suppress_cancellation: true,
            fan_out_depth: DEFAULT_FAN_OUT_DEPTH,
            case_sensitive: !cfg!(windows),
        }
    }
}

impl SearchOptions {
    /// Parses options from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|error| SearchError::Config(format!("invalid search options: {error}")))
    }

    /// Loads options from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|error| {
            SearchError::Config(format!("unable to read {}: {error}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Fan-out depth with the lower bound applied.
    pub fn effective_fan_out_depth(&self) -> usize {
        self.fan_out_depth.max(1)
    }
}
