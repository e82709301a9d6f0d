//! Event contract emitted by the QApe exploratory test runner.
//!
//! The runner announces the end of every explored scenario with a
//! [`ScenarioEndEvent`]. Reporters subscribe to that stream and decide for
//! themselves which events are worth acting on — see
//! [`ScenarioEndEvent::is_reportable`].
//!
//! Scenario identity is structural: two scenarios are the same failure when
//! their step sequences compare equal field-by-field, in order. All types
//! here derive `PartialEq` with exactly that meaning, never identity by
//! reference or by pointer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One reproduction step recorded by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Human-readable description of the performed action.
    pub message: String,

    /// Location the runner navigated to before this step.
    ///
    /// Populated on the first step of a scenario; later steps leave it
    /// unset.
    #[serde(
        rename = "beforeLocation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub before_location: Option<String>,
}

/// Ordered sequence of reproduction steps describing how the runner reached
/// a failure.
pub type Scenario = Vec<Step>;

/// One recorded fault.
///
/// The runner attaches whatever context it captured alongside the message;
/// unknown fields are carried through untouched so reporters can forward the
/// raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioError {
    /// The fault's message/description text.
    pub error: String,

    /// Any additional fields the runner recorded for this fault.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScenarioError {
    /// Build an error carrying only a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            extra: Map::new(),
        }
    }
}

/// Outcome kind attached to a scenario-end event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioOutcome {
    /// The scenario reproduced a failure.
    Failing,
    /// The scenario completed without errors.
    Passing,
    /// Any outcome this crate does not model.
    #[serde(other)]
    Other,
}

/// Payload of the runner's scenario-completion event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEndEvent {
    /// Outcome of the scenario run.
    pub kind: ScenarioOutcome,

    /// Whether the runner finished minimizing the scenario.
    ///
    /// Non-finalized events are intermediate states and carry step sequences
    /// that may still shrink.
    pub finalized: bool,

    /// Reproduction steps.
    #[serde(default)]
    pub scenario: Scenario,

    /// Faults recorded while executing the scenario.
    #[serde(default)]
    pub errors: Vec<ScenarioError>,
}

impl ScenarioEndEvent {
    /// Whether a reporter should act on this event.
    ///
    /// Only finalized failing scenarios qualify; everything else is noise to
    /// a failure reporter.
    pub fn is_reportable(&self) -> bool {
        self.kind == ScenarioOutcome::Failing && self.finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(message: &str, before_location: Option<&str>) -> Step {
        Step {
            message: message.to_string(),
            before_location: before_location.map(String::from),
        }
    }

    #[test]
    fn parses_runner_wire_format() {
        let event: ScenarioEndEvent = serde_json::from_str(
            r#"{
                "kind": "failing",
                "finalized": true,
                "scenario": [
                    {"beforeLocation": "/home", "message": "click button"},
                    {"message": "submit form"}
                ],
                "errors": [{"error": "TypeError: x", "stack": "at main.js:1"}]
            }"#,
        )
        .expect("valid event payload");

        assert_eq!(event.kind, ScenarioOutcome::Failing);
        assert!(event.finalized);
        assert_eq!(event.scenario.len(), 2);
        assert_eq!(
            event.scenario[0].before_location.as_deref(),
            Some("/home")
        );
        assert_eq!(event.scenario[1].before_location, None);
        assert_eq!(event.errors[0].error, "TypeError: x");
        assert_eq!(
            event.errors[0].extra.get("stack"),
            Some(&Value::String("at main.js:1".to_string()))
        );
    }

    #[test]
    fn unknown_outcome_kinds_deserialize_as_other() {
        let event: ScenarioEndEvent = serde_json::from_str(
            r#"{"kind": "browser-crash", "finalized": true, "scenario": [], "errors": []}"#,
        )
        .expect("unknown kind still parses");

        assert_eq!(event.kind, ScenarioOutcome::Other);
        assert!(!event.is_reportable());
    }

    #[test]
    fn only_finalized_failing_events_are_reportable() {
        let mut event = ScenarioEndEvent {
            kind: ScenarioOutcome::Failing,
            finalized: true,
            scenario: vec![step("click button", Some("/home"))],
            errors: vec![ScenarioError::new("TypeError: x")],
        };
        assert!(event.is_reportable());

        event.finalized = false;
        assert!(!event.is_reportable());

        event.finalized = true;
        event.kind = ScenarioOutcome::Passing;
        assert!(!event.is_reportable());
    }

    #[test]
    fn scenario_equality_is_structural() {
        let a = vec![
            step("click button", Some("/home")),
            step("submit form", None),
        ];
        let b = vec![
            step("click button", Some("/home")),
            step("submit form", None),
        ];
        assert_eq!(a, b);

        // Order matters.
        let reversed: Scenario = b.iter().rev().cloned().collect();
        assert_ne!(a, reversed);

        // Every field participates.
        let other_location = vec![
            step("click button", Some("/admin")),
            step("submit form", None),
        ];
        assert_ne!(a, other_location);
    }

    #[test]
    fn step_serialization_uses_runner_field_names() {
        let json = serde_json::to_value(step("click button", Some("/home")))
            .expect("step serializes");
        assert_eq!(
            json,
            serde_json::json!({"message": "click button", "beforeLocation": "/home"})
        );

        // Steps without a location omit the key entirely.
        let json = serde_json::to_value(step("submit form", None)).expect("step serializes");
        assert_eq!(json, serde_json::json!({"message": "submit form"}));
    }
}
