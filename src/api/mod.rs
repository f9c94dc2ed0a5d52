//! HTTP client for OpenAI-compatible model backends.
//!
//! - `completions`: one `/chat/completions` round-trip
//! - `client`: retry orchestration and HTTP client construction

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

mod client;
mod completions;

pub use client::{ApiClient, RetryDecision, RetryPolicy};

/// Minimal model API interface used by the session loop.
///
/// Tests provide scripted implementations; production uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
}
