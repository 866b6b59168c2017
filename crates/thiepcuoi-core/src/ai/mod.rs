//! Completion providers the controller can talk to.

pub mod openrouter;

use async_trait::async_trait;

use crate::config::ApiKey;
use crate::error::ExchangeResult;

pub use openrouter::OpenRouterClient;

/// Everything needed for one stateless completion call: the fixed system
/// instruction and the single latest user turn.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub api_key: ApiKey,
    pub system: String,
    pub user: String,
}

/// What a successful (2xx, JSON) response yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    /// Body parsed but held no non-empty reply text.
    Missing,
}

/// Transport seam between the exchange controller and a hosted model.
///
/// `Err` covers every connection-level failure (non-2xx, transport, body not
/// JSON). A well-formed body without text is `Ok(Completion::Missing)`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> ExchangeResult<Completion>;
}
