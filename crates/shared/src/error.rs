use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// `error` member of a JSON-RPC response.
///
/// Accepts a bare message string or an object with a `message` and an
/// optional numeric `code`; any other JSON value is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcErrorPayload {
    Message(String),
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<i64>,
        message: String,
    },
    Other(Value),
}

impl RpcErrorPayload {
    pub fn message(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::Object { message, .. } => message.clone(),
            Self::Other(value) => value.to_string(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Object { code, .. } => *code,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("service fault in {method}: {message}")]
pub struct ServiceFault {
    pub method: String,
    pub code: Option<i64>,
    pub message: String,
}

impl ServiceFault {
    pub fn new(method: impl Into<String>, payload: &RpcErrorPayload) -> Self {
        Self {
            method: method.into(),
            code: payload.code(),
            message: payload.message(),
        }
    }
}
