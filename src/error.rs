use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::Violation;
use crate::gitlab::TrackerError;
use crate::repo_url::RepoUrlError;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// The templating block of a manifest does not match the schema.
#[derive(Debug, Error)]
#[error(
    "failed to load templating configuration from '{}'; caused by: {}",
    .path.display(),
    join_violations(.violations)
)]
pub struct ConfigValidationError {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing JSON from {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] ConfigValidationError),
}

// ---------------------------------------------------------------------------
// Issue creation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    InvalidRepoUrl(#[from] RepoUrlError),
    #[error(
        "no matching integration configuration for host {host}, please check your integrations config"
    )]
    UnknownIntegration { host: String },
    #[error("no token available for host: {host}")]
    MissingToken { host: String },
    #[error("error converting input date {value:?}")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("creating issue")]
    Tracker(#[from] TrackerError),
}
