//! Decides whether an open backlog issue already describes a failure.

use qape_runner_api::ScenarioError;
use tracing::warn;

use crate::client::TrackerClient;
use crate::types::IssueSummary;

/// Find an open marked issue whose description contains one of the
/// failure's error messages, or `None` if the backlog query fails.
///
/// A failed listing degrades to "no match": creating a possible duplicate
/// beats losing the report entirely.
pub async fn find_reported_issue(
    client: &TrackerClient,
    errors: &[ScenarioError],
) -> Option<u64> {
    match client.list_open_marked_issues().await {
        Ok(issues) => match_backlog(&issues, errors),
        Err(error) => {
            warn!(%error, "unable to list open issues, a duplicate issue might be created");
            None
        }
    }
}

/// First-match-wins scan of the backlog.
///
/// Outer loop over issues in the order the tracker returned them, inner loop
/// over the failure's errors; the first `(issue, error)` pair whose
/// description contains the error text decides the result. Error messages
/// are compared after normalizing embedded newlines to the escaped literal
/// form the composer's JSON rendering produces.
pub fn match_backlog(issues: &[IssueSummary], errors: &[ScenarioError]) -> Option<u64> {
    let needles: Vec<String> = errors
        .iter()
        .map(|error| escape_newlines(&error.error))
        .collect();

    for issue in issues {
        let Some(description) = issue.description.as_deref() else {
            continue;
        };
        for needle in &needles {
            if description.contains(needle.as_str()) {
                return Some(issue.iid);
            }
        }
    }

    None
}

fn escape_newlines(message: &str) -> String {
    message.replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(iid: u64, description: Option<&str>) -> IssueSummary {
        IssueSummary {
            iid,
            description: description.map(String::from),
        }
    }

    #[test]
    fn matches_issue_containing_error_text() {
        let issues = vec![
            issue(41, Some("unrelated failure")),
            issue(42, Some("QApe found: TypeError: x is not a function")),
        ];
        let errors = vec![ScenarioError::new("TypeError: x is not a function")];

        assert_eq!(match_backlog(&issues, &errors), Some(42));
    }

    #[test]
    fn first_matching_issue_wins() {
        let issues = vec![
            issue(41, Some("TypeError: x")),
            issue(42, Some("TypeError: x")),
        ];
        let errors = vec![ScenarioError::new("TypeError: x")];

        assert_eq!(match_backlog(&issues, &errors), Some(41));
    }

    #[test]
    fn any_of_the_failure_errors_can_match() {
        let issues = vec![issue(42, Some("ReferenceError: y is not defined"))];
        let errors = vec![
            ScenarioError::new("TypeError: x"),
            ScenarioError::new("ReferenceError: y is not defined"),
        ];

        assert_eq!(match_backlog(&issues, &errors), Some(42));
    }

    #[test]
    fn multiline_errors_match_their_escaped_rendering() {
        // The composer embeds errors as JSON strings, so a backlog
        // description carries "\n" as two characters.
        let issues = vec![issue(42, Some(r"Error: boom\n    at main.js:1"))];
        let errors = vec![ScenarioError::new("Error: boom\n    at main.js:1")];

        assert_eq!(match_backlog(&issues, &errors), Some(42));
    }

    #[test]
    fn issues_without_description_never_match() {
        let issues = vec![issue(41, None), issue(42, Some("TypeError: x"))];
        let errors = vec![ScenarioError::new("TypeError: x")];

        assert_eq!(match_backlog(&issues, &errors), Some(42));
    }

    #[test]
    fn no_match_yields_none() {
        let issues = vec![issue(41, Some("something else entirely"))];
        let errors = vec![ScenarioError::new("TypeError: x")];

        assert_eq!(match_backlog(&issues, &errors), None);
        assert_eq!(match_backlog(&[], &errors), None);
    }
}
