//! Wires runner events to the tracker.
//!
//! The reporter consumes the runner's scenario-completion events, gates them
//! through the run-local dedup store, and drives the
//! search → match → create-or-comment pipeline against the tracker. The
//! dedup record is written synchronously before the pipeline's first await,
//! so a second event for the same structural scenario arriving while the
//! first is still in flight is rejected without a lock.
//!
//! Once initialized, nothing in here can abort the host: report-time
//! failures are logged and dropped.

use qape_runner_api::{Scenario, ScenarioEndEvent, ScenarioError};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::client::TrackerClient;
use crate::compose;
use crate::config::{AssigneeRef, ReporterConfig};
use crate::dedup::ReportedFailures;
use crate::error::ReporterResult;
use crate::matcher;

/// What a report pipeline did on the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// A new issue was filed.
    Created { iid: u64 },
    /// Evidence was appended to an existing issue.
    Commented { iid: u64 },
}

/// GitLab issue reporter for QApe failure events.
#[derive(Debug)]
pub struct GitlabReporter {
    client: TrackerClient,
    assignee_ids: Vec<u64>,
    seen: ReportedFailures,
    inflight: JoinSet<()>,
}

impl GitlabReporter {
    /// Validate configuration and establish the tracker connection.
    ///
    /// Fails — and the event handler is never attached — when a required
    /// option is missing, the connectivity probe is rejected, or any
    /// configured assignee username cannot be resolved to exactly one user.
    pub async fn init(config: ReporterConfig) -> ReporterResult<Self> {
        config.validate()?;

        let client = TrackerClient::new(&config)?;
        client.probe_project().await?;

        let assignee_ids = resolve_assignees(&client, config.assignees.as_deref()).await?;

        Ok(Self {
            client,
            assignee_ids,
            seen: ReportedFailures::new(),
            inflight: JoinSet::new(),
        })
    }

    /// Consume scenario-completion events until the runner closes the
    /// channel, then wait for in-flight reports to finish.
    pub async fn run(mut self, mut events: UnboundedReceiver<ScenarioEndEvent>) {
        while let Some(event) = events.recv().await {
            self.on_scenario_end(event);
        }
        self.flush().await;
    }

    /// Handle one scenario-completion event.
    ///
    /// Must be called from within a tokio runtime: the tracker round trip is
    /// spawned as a task so the event loop keeps draining while reports are
    /// in flight.
    pub fn on_scenario_end(&mut self, event: ScenarioEndEvent) {
        if !event.is_reportable() {
            debug!(kind = ?event.kind, finalized = event.finalized, "ignoring scenario event");
            return;
        }

        if self.seen.has_seen(&event.scenario) {
            debug!("scenario already reported during this run");
            return;
        }

        // Recorded before the network round trip starts; a concurrent event
        // for the same scenario must not race into a duplicate create.
        self.seen
            .record(event.scenario.clone(), event.errors.clone());

        let client = self.client.clone();
        let assignee_ids = self.assignee_ids.clone();
        self.inflight.spawn(async move {
            match report_failure(&client, &assignee_ids, &event.scenario, &event.errors).await {
                Ok(ReportOutcome::Created { iid }) => {
                    info!(iid, "issue successfully created");
                }
                Ok(ReportOutcome::Commented { iid }) => {
                    info!(iid, "added comment to issue containing more info on the error");
                }
                Err(err) => {
                    error!(%err, "failed to report failure to the tracker");
                }
            }
        });
    }

    /// Await every spawned report pipeline.
    pub async fn flush(&mut self) {
        while let Some(result) = self.inflight.join_next().await {
            if let Err(err) = result {
                error!(%err, "report task did not run to completion");
            }
        }
    }

    /// Number of distinct failures recorded during this run.
    pub fn reported_failures(&self) -> usize {
        self.seen.len()
    }
}

/// Search the backlog and create-or-comment accordingly.
async fn report_failure(
    client: &TrackerClient,
    assignee_ids: &[u64],
    scenario: &Scenario,
    errors: &[ScenarioError],
) -> ReporterResult<ReportOutcome> {
    match matcher::find_reported_issue(client, errors).await {
        Some(iid) => {
            let payload = compose::compose_comment(scenario, errors);
            client.add_comment(iid, &payload).await?;
            Ok(ReportOutcome::Commented { iid })
        }
        None => {
            let payload = compose::compose_issue(scenario, errors, assignee_ids);
            let iid = client.create_issue(&payload).await?;
            Ok(ReportOutcome::Created { iid })
        }
    }
}

/// Replace the raw assignee list with resolved numeric ids.
///
/// Usernames that resolve to zero or several users abort initialization —
/// silently dropping an assignee would hide misconfiguration.
async fn resolve_assignees(
    client: &TrackerClient,
    assignees: Option<&[AssigneeRef]>,
) -> ReporterResult<Vec<u64>> {
    let Some(refs) = assignees else {
        return Ok(Vec::new());
    };

    let mut ids = Vec::with_capacity(refs.len());
    for assignee in refs {
        match assignee {
            AssigneeRef::Id(id) => ids.push(*id),
            AssigneeRef::Username(name) => ids.push(client.resolve_user_id(name).await?),
        }
    }
    Ok(ids)
}
