// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod actions;
pub mod config;
pub mod error;
pub mod gitlab;
pub mod integrations;
pub mod repo_url;

pub use error::{ActionError, ConfigError, ConfigValidationError};
