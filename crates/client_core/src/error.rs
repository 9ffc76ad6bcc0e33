use shared::error::ServiceFault;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Rpc(#[from] ServiceFault),
    #[error("malformed {method} response: {source}")]
    MalformedResponse {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("reasoning service is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },
}

impl ControllerError {
    pub(crate) fn service(operation: &'static str) -> impl FnOnce(ServiceError) -> Self {
        move |source| Self::Service { operation, source }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Service { operation, .. } => operation,
        }
    }
}
