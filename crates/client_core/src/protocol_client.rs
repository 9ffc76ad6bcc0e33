//! JSON-RPC client for the exercise reasoning service.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::{
    domain::{Difficulty, ExerciseId, RuleName},
    error::ServiceFault,
    protocol::{NextStep, RpcRequest, RpcResponse, ServiceMethod, ServiceState, SubmitResult},
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ServiceError, service::ReasoningService, settings::Settings};

pub const DEFAULT_EXERCISE_KIND: &str = "Proposition to DNF";
pub const DEFAULT_EXERCISE_ID: ExerciseId = ExerciseId(421);

pub struct HttpReasoningService {
    http: Client,
    endpoint: Url,
    exercise_kind: String,
    exercise_id: ExerciseId,
}

impl HttpReasoningService {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            exercise_kind: DEFAULT_EXERCISE_KIND.to_string(),
            exercise_id: DEFAULT_EXERCISE_ID,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let Some(raw_url) = settings.service_url.as_deref() else {
            return Ok(None);
        };
        let endpoint = Url::parse(raw_url)
            .with_context(|| format!("invalid service url '{raw_url}'"))?;
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .context("failed to build reasoning service http client")?;
        Ok(Some(Self {
            http,
            endpoint,
            exercise_kind: settings.exercise_kind.clone(),
            exercise_id: settings.exercise_id,
        }))
    }

    pub fn with_exercise(mut self, kind: impl Into<String>, id: ExerciseId) -> Self {
        self.exercise_kind = kind.into();
        self.exercise_id = id;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: ServiceMethod,
        params: Vec<Value>,
    ) -> Result<T, ServiceError> {
        let name = method.as_str();
        let request = RpcRequest::new(method, params, self.exercise_id.0);
        debug!(method = name, id = request.id, "calling reasoning service");

        let transport = |source| ServiceError::Transport {
            method: name,
            source,
        };
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;
        let body = res.bytes().await.map_err(transport)?;

        let response: RpcResponse = serde_json::from_slice(&body)
            .map_err(|source| ServiceError::MalformedResponse {
                method: name,
                source,
            })?;
        if let Some(error) = response.error {
            let fault = ServiceFault::new(name, &error);
            warn!(method = name, message = %fault.message, "reasoning service reported a fault");
            return Err(fault.into());
        }
        serde_json::from_value(response.result).map_err(|source| ServiceError::MalformedResponse {
            method: name,
            source,
        })
    }

    fn state_param(state: &ServiceState) -> Result<Value, ServiceError> {
        serde_json::to_value(state).map_err(|source| ServiceError::MalformedResponse {
            method: "encode state",
            source,
        })
    }
}

#[async_trait]
impl ReasoningService for HttpReasoningService {
    async fn generate(&self, difficulty: Difficulty) -> Result<ServiceState, ServiceError> {
        self.call(
            ServiceMethod::Generate,
            vec![json!(self.exercise_kind), json!(difficulty)],
        )
        .await
    }

    async fn ready(&self, state: &ServiceState) -> Result<bool, ServiceError> {
        self.call(ServiceMethod::Ready, vec![Self::state_param(state)?])
            .await
    }

    async fn applicable(
        &self,
        seed: &str,
        state: &ServiceState,
    ) -> Result<Vec<RuleName>, ServiceError> {
        self.call(
            ServiceMethod::Applicable,
            vec![json!(seed), Self::state_param(state)?],
        )
        .await
    }

    async fn one_first(&self, state: &ServiceState) -> Result<NextStep, ServiceError> {
        self.call(ServiceMethod::OneFirst, vec![Self::state_param(state)?])
            .await
    }

    async fn steps_remaining(&self, state: &ServiceState) -> Result<u32, ServiceError> {
        self.call(ServiceMethod::StepsRemaining, vec![Self::state_param(state)?])
            .await
    }

    async fn submit(
        &self,
        state: &ServiceState,
        term: &str,
    ) -> Result<SubmitResult, ServiceError> {
        self.call(
            ServiceMethod::Submit,
            vec![Self::state_param(state)?, json!(term)],
        )
        .await
    }
}
