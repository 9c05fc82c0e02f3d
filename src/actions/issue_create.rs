use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::actions::clock::{Clock, SystemClock};
use crate::actions::context::ActionContext;
use crate::error::ActionError;
use crate::gitlab::{CreateIssueOptions, Credential, IssueTracker, TrackerClientFactory};
use crate::integrations::{GitLabIntegration, IntegrationsConfig};
use crate::repo_url::parse_repo_url;

/// Identifier under which the action is registered.
pub const ACTION_ID: &str = "gitlab:issues:create";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Default,
    Incident,
    TestCase,
    Task,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Default => "default",
            IssueType::Incident => "incident",
            IssueType::TestCase => "test_case",
            IssueType::Task => "task",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreateRequest {
    /// `host?owner=<owner>&repo=<repo>`
    pub repo_url: String,
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub issue_type: Option<IssueType>,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 date or date-time.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Overrides the integration token for this call.
    #[serde(default)]
    pub token: Option<String>,
    /// User ids.
    #[serde(default)]
    pub assignees: Option<Vec<u64>>,
    /// Comma-separated label names.
    #[serde(default)]
    pub labels: Option<String>,
    #[serde(default)]
    pub confidential: Option<bool>,
    #[serde(default)]
    pub epic_id: Option<u64>,
    #[serde(default)]
    pub milestone_id: Option<u64>,
    #[serde(default)]
    pub weight: Option<u64>,
    #[serde(default)]
    pub discussion_to_resolve: Option<String>,
    #[serde(default)]
    pub merge_request_to_resolve_discussions_of: Option<u64>,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Creates one issue and emits `issueId` and `issueUrl`.
pub struct IssueCreateAction<F, C = SystemClock> {
    integrations: IntegrationsConfig,
    clients: F,
    clock: C,
}

impl<F: TrackerClientFactory> IssueCreateAction<F, SystemClock> {
    pub fn new(integrations: IntegrationsConfig, clients: F) -> Self {
        Self::with_clock(integrations, clients, SystemClock)
    }
}

impl<F: TrackerClientFactory, C: Clock> IssueCreateAction<F, C> {
    pub fn with_clock(integrations: IntegrationsConfig, clients: F, clock: C) -> Self {
        Self {
            integrations,
            clients,
            clock,
        }
    }

    pub async fn handler(
        &self,
        ctx: &mut ActionContext<'_, IssueCreateRequest>,
    ) -> Result<(), ActionError> {
        let input = &ctx.input;
        if input.title.trim().is_empty() {
            return Err(ActionError::InvalidInput("title must not be empty".to_owned()));
        }

        let repo = parse_repo_url(&input.repo_url)?;
        let integration = self.integrations.gitlab_by_host(&repo.host).ok_or_else(|| {
            ActionError::UnknownIntegration {
                host: repo.host.clone(),
            }
        })?;
        let credential = resolve_credential(input.token.as_deref(), integration)?;
        tracing::debug!(
            "{ACTION_ID}: host {} ({:?}), repo {}/{}",
            repo.host,
            credential,
            repo.owner,
            repo.repo
        );

        let options = build_options(input, self.clock.now())?;
        let client = self.clients.client_for(integration, credential)?;

        tracing::info!("{ACTION_ID}: creating issue in project {}", input.project_id);
        let issue = client
            .create_issue(input.project_id, &input.title, &options)
            .await?;
        tracing::info!("{ACTION_ID}: created issue {} at {}", issue.id, issue.web_url);

        ctx.output("issueId", issue.id);
        ctx.output("issueUrl", issue.web_url);
        Ok(())
    }
}

/// An explicit per-call token wins over the integration token.
fn resolve_credential(
    explicit: Option<&str>,
    integration: &GitLabIntegration,
) -> Result<Credential, ActionError> {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return Ok(Credential::OAuth(token.to_owned()));
    }
    integration
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| Credential::Private(t.to_owned()))
        .ok_or_else(|| ActionError::MissingToken {
            host: integration.host.clone(),
        })
}

/// Translate the request into client options, filling defaults for absent
/// fields.
fn build_options(
    input: &IssueCreateRequest,
    now: DateTime<Utc>,
) -> Result<CreateIssueOptions, ActionError> {
    let due_date = input
        .due_date
        .as_deref()
        .map(|value| {
            parse_date(value)
                .map(to_iso_string)
                .map_err(|source| ActionError::DateParse {
                    value: value.to_owned(),
                    source,
                })
        })
        .transpose()?;

    Ok(CreateIssueOptions {
        description: input.description.clone().unwrap_or_default(),
        assignee_ids: input.assignees.clone().unwrap_or_default(),
        confidential: input.confidential.unwrap_or(false),
        epic_id: input.epic_id,
        labels: input.labels.clone().unwrap_or_default(),
        created_at: to_iso_string(now),
        due_date,
        discussion_to_resolve: input.discussion_to_resolve.clone().unwrap_or_default(),
        issue_type: input.issue_type.map(|t| t.as_str().to_owned()),
        merge_request_to_resolve_discussions_of: input.merge_request_to_resolve_discussions_of,
        milestone_id: input.milestone_id,
        weight: input.weight,
    })
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`
fn to_iso_string(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Accepts RFC 3339, a date-time without offset (taken as UTC) or a bare
/// `YYYY-MM-DD` (UTC midnight).
fn parse_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::default()).and_utc())
}
