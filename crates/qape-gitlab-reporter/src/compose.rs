//! Renders a failure into the tracker's content format.
//!
//! Issue and comment bodies share one narrative: the raw errors as
//! pretty-printed JSON, a human-readable reproduction recipe, and the full
//! `{errors, scenario}` structure for machine replay. The matcher relies on
//! the first section — it searches backlog descriptions for error messages
//! exactly as this module renders them.

use chrono::Utc;
use qape_runner_api::{ScenarioError, Step};
use serde::Serialize;

use crate::types::{CommentPayload, IssuePayload, MARKER_LABEL};

const NEW_FAILURE_OPENING: &str =
    "QApe found a scenario, which leads to the following error:";
const KNOWN_FAILURE_OPENING: &str =
    "QApe found another scenario, which leads to the following error:";

/// Full `{errors, scenario}` structure embedded for machine replay.
#[derive(Serialize)]
struct ReplayBundle<'a> {
    errors: &'a [ScenarioError],
    scenario: &'a [Step],
}

/// Build the payload for a brand-new issue.
///
/// The title is a marker prefix plus the current timestamp — unique without
/// depending on the failure's content. Assignees are attached here and only
/// here; comments never re-assign.
pub fn compose_issue(
    scenario: &[Step],
    errors: &[ScenarioError],
    assignee_ids: &[u64],
) -> IssuePayload {
    IssuePayload {
        title: format!("{}_{}", MARKER_LABEL, Utc::now().timestamp_millis()),
        description: render_report(scenario, errors, NEW_FAILURE_OPENING),
        labels: MARKER_LABEL.to_string(),
        assignee_ids: assignee_ids.to_vec(),
    }
}

/// Build the comment payload for an issue that already describes this error.
pub fn compose_comment(scenario: &[Step], errors: &[ScenarioError]) -> CommentPayload {
    CommentPayload {
        body: render_report(scenario, errors, KNOWN_FAILURE_OPENING),
    }
}

fn render_report(scenario: &[Step], errors: &[ScenarioError], opening: &str) -> String {
    format!(
        "{opening}\n\n```\n{errors_json}\n```\n\n\
         Following scenario reproduces the error:\n\n{steps}\n\n\
         JSON:\n\n```\n{replay_json}\n```",
        errors_json = pretty_tab_json(&errors),
        steps = render_steps(scenario),
        replay_json = pretty_tab_json(&ReplayBundle { errors, scenario }),
    )
}

/// One bullet per step message, preceded by a "Go to" line when the first
/// step recorded a starting location.
fn render_steps(scenario: &[Step]) -> String {
    let mut lines = Vec::with_capacity(scenario.len() + 1);
    if let Some(location) = scenario.first().and_then(|step| step.before_location.as_deref()) {
        lines.push(format!("- Go to {location}"));
    }
    lines.extend(scenario.iter().map(|step| format!("- {}", step.message)));
    lines.join("\n")
}

/// Tab-indented pretty JSON.
///
/// The inputs are plain data types whose serialization cannot fail; an empty
/// string is returned in the impossible case rather than panicking inside a
/// report pipeline.
fn pretty_tab_json<T: Serialize>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
