//! API payload types for the tracker protocol.

use serde::{Deserialize, Serialize};

/// Label attached to every issue this reporter creates.
///
/// The backlog search filters on the same label, so the reporter only ever
/// matches against issues it (or another QApe run) filed itself.
pub const MARKER_LABEL: &str = "QApe";

/// Dedup-lookup view of an open tracker issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    /// Project-scoped issue id.
    pub iid: u64,

    /// Issue body. Absent when the issue was filed without one.
    #[serde(default)]
    pub description: Option<String>,
}

/// User record returned by the user-lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabUser {
    /// Numeric user id.
    pub id: u64,
}

/// Response to a successful issue create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// Project-scoped id of the new issue.
    pub iid: u64,
}

/// Request body for creating a new issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePayload {
    /// Unique title, derived from a timestamp rather than content.
    pub title: String,

    /// Narrative body: raw errors, reproduction recipe, replay JSON.
    pub description: String,

    /// Comma-separated label list; always [`MARKER_LABEL`].
    pub labels: String,

    /// Resolved assignee ids, attached only on create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<u64>,
}

/// Request body for commenting on an existing issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPayload {
    /// Narrative body, framed as further evidence for a known failure.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_summary_tolerates_missing_description() {
        let issue: IssueSummary =
            serde_json::from_str(r#"{"iid": 42}"#).expect("summary parses");
        assert_eq!(issue.iid, 42);
        assert!(issue.description.is_none());
    }

    #[test]
    fn issue_payload_omits_empty_assignees() {
        let payload = IssuePayload {
            title: "QApe_1700000000000".to_string(),
            description: "body".to_string(),
            labels: MARKER_LABEL.to_string(),
            assignee_ids: Vec::new(),
        };
        let json = serde_json::to_value(&payload).expect("payload serializes");
        assert!(json.get("assignee_ids").is_none());

        let payload = IssuePayload {
            assignee_ids: vec![7, 12],
            ..payload
        };
        let json = serde_json::to_value(&payload).expect("payload serializes");
        assert_eq!(json["assignee_ids"], serde_json::json!([7, 12]));
    }
}
