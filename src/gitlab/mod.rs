//! Issue tracker port and its GitLab REST implementation.

mod client;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::integrations::GitLabIntegration;

pub use client::{GitLabClient, GitLabClientFactory};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("building HTTP client")]
    Build(#[source] reqwest::Error),
    #[error("issue tracker request failed")]
    Transport(#[source] reqwest::Error),
    #[error("issue tracker returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("decoding issue tracker response")]
    Decode(#[source] reqwest::Error),
}

/// How a token is presented to the tracker.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Integration-level personal/project token (`PRIVATE-TOKEN` header).
    Private(String),
    /// Per-call token supplied by the caller (`Authorization: Bearer`).
    OAuth(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private(_) => f.write_str("Private(<redacted>)"),
            Self::OAuth(_) => f.write_str("OAuth(<redacted>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Options accepted by the issue-creation endpoint. `None` fields are
/// omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateIssueOptions {
    pub description: String,
    pub assignee_ids: Vec<u64>,
    pub confidential: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<u64>,
    pub labels: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub discussion_to_resolve: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_request_to_resolve_discussions_of: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,
}

/// The part of the created issue we report back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub id: u64,
    #[serde(default)]
    pub iid: Option<u64>,
    pub web_url: String,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// A client able to create issues in a project.
pub trait IssueTracker {
    fn create_issue(
        &self,
        project_id: u64,
        title: &str,
        options: &CreateIssueOptions,
    ) -> impl Future<Output = Result<CreatedIssue, TrackerError>> + Send;
}

/// Builds an [`IssueTracker`] for a configured host and credential.
pub trait TrackerClientFactory {
    type Client: IssueTracker;

    fn client_for(
        &self,
        integration: &GitLabIntegration,
        credential: Credential,
    ) -> Result<Self::Client, TrackerError>;
}
