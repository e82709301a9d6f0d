//! HTTP client for the GitLab issue tracker.
//!
//! Every operation is a single attempt: the reporter prefers losing one
//! report over stalling the test run behind retries, so status and transport
//! failures map straight to a [`ReporterError`] carrying the attempted
//! operation, url, and received status for operator diagnosis.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::ReporterConfig;
use crate::error::{ReporterError, ReporterResult};
use crate::types::{
    CommentPayload, CreatedIssue, GitlabUser, IssuePayload, IssueSummary, MARKER_LABEL,
};

/// User agent for tracker requests.
const USER_AGENT_VALUE: &str = concat!("qape-gitlab-reporter/", env!("CARGO_PKG_VERSION"));

/// Header carrying the credential on every request.
const PRIVATE_TOKEN: HeaderName = HeaderName::from_static("private-token");

/// Tracker client bound to one GitLab project.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    /// HTTP client.
    client: reqwest::Client,

    /// Base URL of the GitLab instance, without trailing slash.
    base_url: String,

    /// Project id or URL-encoded project path.
    project_id: String,
}

impl TrackerClient {
    /// Create a new tracker client.
    pub fn new(config: &ReporterConfig) -> ReporterResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut token =
            HeaderValue::from_str(&config.private_token).map_err(|_| ReporterError::Config {
                message: "option `privateToken` contains characters not allowed in a header"
                    .to_string(),
            })?;
        token.set_sensitive(true);
        default_headers.insert(PRIVATE_TOKEN, token);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ReporterError::Config {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        // Normalize base URL (remove trailing slash)
        let base_url = config.url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            project_id: config.project_id.clone(),
        })
    }

    /// Confirm endpoint, credential, and project id with a lightweight call.
    ///
    /// `GET /api/v4/projects/{id}` must answer 200; anything else is fatal
    /// to initialization.
    pub async fn probe_project(&self) -> ReporterResult<()> {
        let url = self.project_url("");
        debug!(url = %url, "probing tracker project");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| ReporterError::Connectivity {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ReporterError::Connectivity {
                url,
                reason: format!("received wrong status code {}", status.as_u16()),
            });
        }

        Ok(())
    }

    /// Resolve a username to its numeric user id.
    ///
    /// Zero matches and ambiguous matches both fail: silently picking one of
    /// several users would assign issues to the wrong person.
    pub async fn resolve_user_id(&self, username: &str) -> ReporterResult<u64> {
        let url = format!("{}/api/v4/users", self.base_url);
        debug!(url = %url, username = %username, "resolving assignee username");

        let lookup_error = |reason: String| ReporterError::Lookup {
            username: username.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .query(&[("username", username)])
            .send()
            .await
            .map_err(|e| lookup_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(lookup_error(format!(
                "received wrong status code {}",
                status.as_u16()
            )));
        }

        let users: Vec<GitlabUser> = response
            .json()
            .await
            .map_err(|e| lookup_error(format!("failed to parse user list: {e}")))?;

        match users.as_slice() {
            [] => Err(lookup_error("no matching user".to_string())),
            [user] => Ok(user.id),
            _ => Err(lookup_error(format!("{} users match", users.len()))),
        }
    }

    /// List open issues carrying this reporter's marker label.
    ///
    /// Filtering happens server-side via `state=opened&labels=QApe`.
    pub async fn list_open_marked_issues(&self) -> ReporterResult<Vec<IssueSummary>> {
        let url = self.project_url("/issues");
        debug!(url = %url, "listing open marked issues");

        let list_error = |reason: String| ReporterError::List {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .query(&[("state", "opened"), ("labels", MARKER_LABEL)])
            .send()
            .await
            .map_err(|e| list_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(list_error(format!(
                "received wrong status code {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| list_error(format!("failed to parse issue list: {e}")))
    }

    /// Create a new issue; returns its project-scoped id.
    ///
    /// The tracker answers a create with 201 specifically — a generic 200
    /// means the write did not happen the way we asked and is reported as a
    /// failure.
    pub async fn create_issue(&self, payload: &IssuePayload) -> ReporterResult<u64> {
        let url = self.project_url("/issues");
        debug!(url = %url, title = %payload.title, "creating tracker issue");

        let create_error = |reason: String| ReporterError::Create {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| create_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(create_error(format!(
                "received wrong status code {}",
                status.as_u16()
            )));
        }

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| create_error(format!("failed to parse created issue: {e}")))?;

        Ok(created.iid)
    }

    /// Append a comment to an existing issue.
    pub async fn add_comment(&self, iid: u64, payload: &CommentPayload) -> ReporterResult<()> {
        let url = self.project_url(&format!("/issues/{iid}/notes"));
        debug!(url = %url, iid, "adding comment to tracker issue");

        let comment_error = |reason: String| ReporterError::Comment {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| comment_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(comment_error(format!(
                "received wrong status code {}",
                status.as_u16()
            )));
        }

        Ok(())
    }

    /// Build a project-scoped API url.
    fn project_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4/projects/{}{}",
            self.base_url, self.project_id, path
        )
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
