//! Run-local record of failures already reported.

use qape_runner_api::{Scenario, ScenarioError, Step};

/// One processed failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub scenario: Scenario,
    pub errors: Vec<ScenarioError>,
}

/// Append-only store of failures processed during this run.
///
/// Lookup is a linear scan by structural scenario equality; failure counts
/// per run are small, and the store lives exactly as long as the process.
/// There is no removal.
#[derive(Debug, Default)]
pub struct ReportedFailures {
    records: Vec<FailureRecord>,
}

impl ReportedFailures {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a structurally-equal scenario was already recorded.
    pub fn has_seen(&self, scenario: &[Step]) -> bool {
        self.records
            .iter()
            .any(|record| record.scenario.as_slice() == scenario)
    }

    /// Record a failure as processed.
    pub fn record(&mut self, scenario: Scenario, errors: Vec<ScenarioError>) {
        self.records.push(FailureRecord { scenario, errors });
    }

    /// Number of failures recorded so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
