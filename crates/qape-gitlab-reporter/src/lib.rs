//! GitLab issue reporter for the QApe exploratory test runner.
//!
//! Listens for scenario-failure events and files one tracker issue per
//! distinct failure, appending evidence to an existing issue when the open
//! backlog already describes the same error:
//!
//! - run-local dedup by structural scenario equality gates re-processing;
//! - the open backlog (filtered by the `QApe` marker label) is searched for
//!   an issue whose description contains one of the failure's error
//!   messages;
//! - a match gets a comment, anything else gets a new issue.
//!
//! # Quick Start
//!
//! ```no_run
//! use qape_gitlab_reporter::{GitlabReporter, ReporterConfig};
//!
//! # async fn example(runner_config: serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReporterConfig::from_runner_config(&runner_config)?;
//! let reporter = GitlabReporter::init(config).await?;
//!
//! let (events, receiver) = tokio::sync::mpsc::unbounded_channel();
//! tokio::spawn(reporter.run(receiver));
//! // Hand `events` to the runner; every scenario-completion event lands here.
//! # drop(events);
//! # Ok(())
//! # }
//! ```
//!
//! # Failure policy
//!
//! Initialization is strict: missing options, a failed connectivity probe,
//! or an unresolvable assignee username all prevent the event handler from
//! being attached. After that the policy inverts — every tracker failure is
//! logged via `tracing` and dropped, because a reporter must never take down
//! the test run it is reporting on.

pub mod client;
pub mod compose;
pub mod config;
pub mod dedup;
pub mod error;
pub mod matcher;
pub mod reporter;
pub mod types;

// Re-export main types
pub use client::TrackerClient;
pub use config::{AssigneeRef, ReporterConfig};
pub use dedup::{FailureRecord, ReportedFailures};
pub use error::{ReporterError, ReporterResult};
pub use reporter::{GitlabReporter, ReportOutcome};
pub use types::{
    CommentPayload, CreatedIssue, GitlabUser, IssuePayload, IssueSummary, MARKER_LABEL,
};
