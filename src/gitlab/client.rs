use serde::Serialize;

use crate::gitlab::{
    CreateIssueOptions, CreatedIssue, Credential, IssueTracker, TrackerClientFactory, TrackerError,
};
use crate::integrations::GitLabIntegration;

const ERROR_BODY_LIMIT: usize = 160;

/// GitLab REST v4 client bound to one instance and one credential.
pub struct GitLabClient {
    http: reqwest::Client,
    api_base_url: String,
    credential: Credential,
}

impl GitLabClient {
    pub fn new(
        api_base_url: impl Into<String>,
        credential: Credential,
    ) -> Result<Self, TrackerError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("scaffold-kit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TrackerError::Build)?;
        Ok(Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
            credential,
        })
    }
}

#[derive(Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    #[serde(flatten)]
    options: &'a CreateIssueOptions,
}

impl IssueTracker for GitLabClient {
    async fn create_issue(
        &self,
        project_id: u64,
        title: &str,
        options: &CreateIssueOptions,
    ) -> Result<CreatedIssue, TrackerError> {
        let endpoint = format!("{}/projects/{project_id}/issues", self.api_base_url);
        let body = CreateIssueBody { title, options };

        let request = self.http.post(&endpoint).json(&body);
        let request = match &self.credential {
            Credential::Private(token) => request.header("PRIVATE-TOKEN", token),
            Credential::OAuth(token) => request.bearer_auth(token),
        };

        tracing::debug!("gitlab: POST {endpoint}");
        let response = request.send().await.map_err(TrackerError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TrackerError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        response.json().await.map_err(TrackerError::Decode)
    }
}

/// Extract a readable message from a GitLab error body.
///
/// GitLab answers with `{"message": "..."}`, `{"message": {field: [..]}}` or
/// `{"error": "..."}`. Anything else is returned truncated.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("message").or_else(|| value.get("error")) {
            Some(serde_json::Value::String(message)) => return message.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    if body.trim().is_empty() {
        return "(empty response body)".to_owned();
    }
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

/// Factory producing a [`GitLabClient`] per integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLabClientFactory;

impl TrackerClientFactory for GitLabClientFactory {
    type Client = GitLabClient;

    fn client_for(
        &self,
        integration: &GitLabIntegration,
        credential: Credential,
    ) -> Result<GitLabClient, TrackerError> {
        GitLabClient::new(integration.api_base_url(), credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_string_field() {
        assert_eq!(
            error_message(r#"{"message": "404 Project Not Found"}"#),
            "404 Project Not Found"
        );
        assert_eq!(
            error_message(r#"{"error": "insufficient_scope"}"#),
            "insufficient_scope"
        );
    }

    #[test]
    fn error_message_from_structured_field() {
        assert_eq!(
            error_message(r#"{"message": {"title": ["can't be blank"]}}"#),
            r#"{"title":["can't be blank"]}"#
        );
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(error_message(""), "(empty response body)");
        let long = "x".repeat(500);
        assert_eq!(error_message(&long).len(), ERROR_BODY_LIMIT);
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn body_flattens_options_and_omits_absent_fields() {
        let options = CreateIssueOptions {
            created_at: "2024-01-01T00:00:00.000Z".to_owned(),
            weight: Some(3),
            ..CreateIssueOptions::default()
        };
        let body = serde_json::to_value(CreateIssueBody {
            title: "Hello",
            options: &options,
        })
        .unwrap();
        assert_eq!(body["title"], "Hello");
        assert_eq!(body["description"], "");
        assert_eq!(body["assignee_ids"], serde_json::json!([]));
        assert_eq!(body["weight"], 3);
        assert!(body.get("due_date").is_none());
        assert!(body.get("issue_type").is_none());
    }
}
