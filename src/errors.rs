//! Typed error hierarchy for planchain.
//!
//! Four enums cover the four failure surfaces:
//! - `ConfigError` — missing/malformed settings, detected before any phase runs
//! - `ScenarioError` — unknown scenario ids and definition-file problems
//! - `CompletionError` — failures of the completion API call itself
//! - `WorkflowError` — chain-level failures, attributed to a phase

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading and validating settings.
///
/// Any of these aborts the run before the first completion call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set (export it or add it to a .env file)")]
    MissingApiKey,

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors from resolving a scenario id or loading a definitions file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown scenario '{id}' (available: {available})")]
    Unknown { id: String, available: String },

    #[error("failed to read scenario definitions at {path}: {source}")]
    DefinitionsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario definitions at {path}: {source}")]
    DefinitionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scenario definitions at {path} do not define '{id}'")]
    NotDefined { id: String, path: PathBuf },
}

/// Errors from a single completion request.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion API returned no choices")]
    EmptyResponse,
}

/// Errors from the phase chain. A failed phase aborts the run; no later
/// phase executes and no retry is attempted.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("phase {index} ({phase}) failed: {source}")]
    PhaseFailed {
        index: usize,
        phase: String,
        #[source]
        source: CompletionError,
    },
}

impl WorkflowError {
    /// 1-based index of the phase this error is attributed to.
    pub fn phase_index(&self) -> usize {
        match self {
            WorkflowError::PhaseFailed { index, .. } => *index,
        }
    }
}
