//! Reporter configuration.
//!
//! The runner hands reporters an opaque settings object; this reporter reads
//! the `reporterOptions.gitlab` subtree of it. Validation happens exactly
//! once, in [`GitlabReporter::init`], before any tracker call is attempted —
//! an invalid configuration means the event handler is never attached.
//!
//! [`GitlabReporter::init`]: crate::reporter::GitlabReporter::init

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReporterError, ReporterResult};

/// Reference to an assignee in the raw configuration.
///
/// Users may be given by numeric id or by username; usernames are resolved
/// to ids during initialization and the resolved list replaces this raw
/// form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssigneeRef {
    /// Already a numeric user id; passed through untouched.
    Id(u64),
    /// A username; resolved via the tracker's user-lookup call.
    Username(String),
}

/// Options for the GitLab reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterConfig {
    /// Base URL of the GitLab instance, e.g. `https://gitlab.example.com`.
    #[serde(default)]
    pub url: String,

    /// Project id or URL-encoded project path.
    #[serde(default)]
    pub project_id: String,

    /// Private token sent as the `PRIVATE-TOKEN` header.
    #[serde(default)]
    pub private_token: String,

    /// Users to assign to newly created issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<AssigneeRef>>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            project_id: String::new(),
            private_token: String::new(),
            assignees: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ReporterConfig {
    /// Extract this reporter's options from the runner's settings object.
    ///
    /// The runner nests per-reporter options under `reporterOptions.<name>`;
    /// a missing subtree yields an empty config that fails [`validate`].
    ///
    /// [`validate`]: ReporterConfig::validate
    pub fn from_runner_config(config: &Value) -> ReporterResult<Self> {
        let options = config
            .pointer("/reporterOptions/gitlab")
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        Self::from_value(options)
    }

    /// Deserialize options from an opaque settings value.
    pub fn from_value(value: Value) -> ReporterResult<Self> {
        serde_json::from_value(value).map_err(|e| ReporterError::Config {
            message: format!("invalid gitlab reporter options: {e}"),
        })
    }

    /// Check that every required option is present.
    pub fn validate(&self) -> ReporterResult<()> {
        let required = [
            (&self.url, "url"),
            (&self.project_id, "projectId"),
            (&self.private_token, "privateToken"),
        ];
        for (value, option) in required {
            if value.trim().is_empty() {
                return Err(ReporterError::Config {
                    message: format!(
                        "missing required reporter option `{option}`, \
                         update your config according to documentation"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Set the private token.
    pub fn with_private_token(mut self, private_token: impl Into<String>) -> Self {
        self.private_token = private_token.into();
        self
    }

    /// Set the assignee list.
    pub fn with_assignees(mut self, assignees: Vec<AssigneeRef>) -> Self {
        self.assignees = Some(assignees);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_each_missing_required_option() {
        let complete = ReporterConfig::default()
            .with_url("https://gitlab.example.com")
            .with_project_id("7")
            .with_private_token("secret");
        assert!(complete.validate().is_ok());

        for missing in ["url", "projectId", "privateToken"] {
            let mut config = complete.clone();
            match missing {
                "url" => config.url.clear(),
                "projectId" => config.project_id.clear(),
                _ => config.private_token.clear(),
            }
            let error = config.validate().expect_err("must reject");
            assert!(error.is_fatal());
            assert!(
                error.to_string().contains(missing),
                "error should name the missing option: {error}"
            );
        }
    }

    #[test]
    fn parses_runner_settings_subtree() {
        let runner_config = serde_json::json!({
            "parallelInstances": 2,
            "reporterOptions": {
                "gitlab": {
                    "url": "https://gitlab.example.com",
                    "projectId": "7",
                    "privateToken": "secret",
                    "assignees": ["alice", 12]
                }
            }
        });

        let config =
            ReporterConfig::from_runner_config(&runner_config).expect("options parse");
        assert_eq!(config.url, "https://gitlab.example.com");
        assert_eq!(config.project_id, "7");
        assert_eq!(
            config.assignees,
            Some(vec![
                AssigneeRef::Username("alice".to_string()),
                AssigneeRef::Id(12)
            ])
        );
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn missing_subtree_yields_invalid_config() {
        let config = ReporterConfig::from_runner_config(&serde_json::json!({}))
            .expect("empty options still deserialize");
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_assignees_fail_deserialization() {
        let result = ReporterConfig::from_value(serde_json::json!({
            "url": "https://gitlab.example.com",
            "projectId": "7",
            "privateToken": "secret",
            "assignees": [{"name": "alice"}]
        }));
        assert!(matches!(result, Err(ReporterError::Config { .. })));
    }
}
