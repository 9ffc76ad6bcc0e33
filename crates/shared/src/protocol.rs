use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{Location, RuleName},
    error::RpcErrorPayload,
};

/// Opaque exercise state owned by the reasoning service.
///
/// Only `exercise` (the current term) is read on the client; every other
/// field is kept as-is so the token survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceState {
    pub exercise: String,
    #[serde(flatten)]
    pub opaque: Map<String, Value>,
}

impl ServiceState {
    pub fn new(exercise: impl Into<String>) -> Self {
        Self {
            exercise: exercise.into(),
            opaque: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.opaque.insert(key.into(), value);
        self
    }
}

/// Verdict on a submitted rewrite step.
///
/// Any value other than the strings `"Ok"` and `"Detour"` is a rejection;
/// non-string values are kept as their JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum FeedbackOutcome {
    /// Valid step along the expected path.
    Ok,
    /// Valid step, but not the one the strategy expected.
    Detour,
    /// Anything else the service reports (buggy step, unknown term, ...).
    Other(String),
}

impl FeedbackOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Ok | Self::Detour)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "Ok",
            Self::Detour => "Detour",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for FeedbackOutcome {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Ok" => Self::Ok,
            "Detour" => Self::Detour,
            _ => Self::Other(value),
        }
    }
}

impl From<Value> for FeedbackOutcome {
    fn from(value: Value) -> Self {
        match value {
            Value::String(raw) => raw.into(),
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<FeedbackOutcome> for String {
    fn from(value: FeedbackOutcome) -> Self {
        match value {
            FeedbackOutcome::Other(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

/// Remote operations exposed by the exercise service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethod {
    Generate,
    Ready,
    Applicable,
    OneFirst,
    StepsRemaining,
    Submit,
}

impl ServiceMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Ready => "ready",
            Self::Applicable => "applicable",
            Self::OneFirst => "onefirst",
            Self::StepsRemaining => "stepsremaining",
            Self::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub id: i64,
}

impl RpcRequest {
    pub fn new(method: ServiceMethod, params: Vec<Value>, id: i64) -> Self {
        Self {
            method: method.as_str().to_string(),
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RpcResponse {
    pub fn ok(result: Value, id: i64) -> Self {
        Self {
            result,
            error: None,
            id: Some(Value::from(id)),
        }
    }

    pub fn fault(error: RpcErrorPayload, id: i64) -> Self {
        Self {
            result: Value::Null,
            error: Some(error),
            id: Some(Value::from(id)),
        }
    }
}

/// Result of `onefirst`: the next rule the strategy would apply, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct NextStep {
    pub rule: Option<RuleName>,
    pub location: Location,
    pub state: ServiceState,
}

impl<'de> Deserialize<'de> for NextStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (rule, location, state) =
            <(Option<RuleName>, Location, ServiceState)>::deserialize(deserializer)?;
        Ok(Self {
            rule,
            location,
            state,
        })
    }
}

impl Serialize for NextStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (&self.rule, &self.location, &self.state).serialize(serializer)
    }
}

/// Result of `submit`.
///
/// Rejected steps may come back without rules or state; only an accepted
/// outcome has to carry the state to continue from.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResult {
    pub outcome: FeedbackOutcome,
    pub applied_rules: Vec<RuleName>,
    pub state: Option<ServiceState>,
}

impl SubmitResult {
    pub fn accepted(
        outcome: FeedbackOutcome,
        applied_rules: Vec<RuleName>,
        state: ServiceState,
    ) -> Self {
        Self {
            outcome,
            applied_rules,
            state: Some(state),
        }
    }

    pub fn rejected(outcome: impl Into<String>) -> Self {
        Self {
            outcome: FeedbackOutcome::Other(outcome.into()),
            applied_rules: Vec::new(),
            state: None,
        }
    }
}

impl<'de> Deserialize<'de> for SubmitResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (outcome, applied_rules, state) =
            <(FeedbackOutcome, Value, Value)>::deserialize(deserializer)?;
        if !outcome.is_accepted() {
            return Ok(Self {
                outcome,
                applied_rules: serde_json::from_value(applied_rules).unwrap_or_default(),
                state: serde_json::from_value(state).ok(),
            });
        }

        let applied_rules = Option::<Vec<RuleName>>::deserialize(applied_rules)
            .map_err(serde::de::Error::custom)?
            .unwrap_or_default();
        let state = ServiceState::deserialize(state).map_err(serde::de::Error::custom)?;
        Ok(Self {
            outcome,
            applied_rules,
            state: Some(state),
        })
    }
}

impl Serialize for SubmitResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (&self.outcome, &self.applied_rules, &self.state).serialize(serializer)
    }
}
