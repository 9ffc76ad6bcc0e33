use async_trait::async_trait;
use shared::{
    domain::{Difficulty, RuleName},
    protocol::{NextStep, ServiceState, SubmitResult},
};

use crate::error::ServiceError;

/// Remote oracle that owns all exercise reasoning.
///
/// The client never inspects a [`ServiceState`] beyond its current term; it
/// only threads the token from one call into the next.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn generate(&self, difficulty: Difficulty) -> Result<ServiceState, ServiceError>;
    async fn ready(&self, state: &ServiceState) -> Result<bool, ServiceError>;
    async fn applicable(
        &self,
        seed: &str,
        state: &ServiceState,
    ) -> Result<Vec<RuleName>, ServiceError>;
    async fn one_first(&self, state: &ServiceState) -> Result<NextStep, ServiceError>;
    async fn steps_remaining(&self, state: &ServiceState) -> Result<u32, ServiceError>;
    async fn submit(
        &self,
        state: &ServiceState,
        term: &str,
    ) -> Result<SubmitResult, ServiceError>;
}

pub struct MissingReasoningService;

#[async_trait]
impl ReasoningService for MissingReasoningService {
    async fn generate(&self, _difficulty: Difficulty) -> Result<ServiceState, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn ready(&self, _state: &ServiceState) -> Result<bool, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn applicable(
        &self,
        _seed: &str,
        _state: &ServiceState,
    ) -> Result<Vec<RuleName>, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn one_first(&self, _state: &ServiceState) -> Result<NextStep, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn steps_remaining(&self, _state: &ServiceState) -> Result<u32, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn submit(
        &self,
        _state: &ServiceState,
        _term: &str,
    ) -> Result<SubmitResult, ServiceError> {
        Err(ServiceError::Unavailable)
    }
}

#[async_trait]
impl<T> ReasoningService for std::sync::Arc<T>
where
    T: ReasoningService + ?Sized,
{
    async fn generate(&self, difficulty: Difficulty) -> Result<ServiceState, ServiceError> {
        (**self).generate(difficulty).await
    }

    async fn ready(&self, state: &ServiceState) -> Result<bool, ServiceError> {
        (**self).ready(state).await
    }

    async fn applicable(
        &self,
        seed: &str,
        state: &ServiceState,
    ) -> Result<Vec<RuleName>, ServiceError> {
        (**self).applicable(seed, state).await
    }

    async fn one_first(&self, state: &ServiceState) -> Result<NextStep, ServiceError> {
        (**self).one_first(state).await
    }

    async fn steps_remaining(&self, state: &ServiceState) -> Result<u32, ServiceError> {
        (**self).steps_remaining(state).await
    }

    async fn submit(
        &self,
        state: &ServiceState,
        term: &str,
    ) -> Result<SubmitResult, ServiceError> {
        (**self).submit(state, term).await
    }
}
