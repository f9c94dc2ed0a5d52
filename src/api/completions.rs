//! `/chat/completions` request helper.

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};

/// Send one `/chat/completions` request and parse the response payload.
pub(crate) async fn request(
    http: &reqwest::Client,
    base_url: &str,
    request: &ChatRequest,
    api_key: &str,
) -> Result<ChatResponse, ApiError> {
    let url = format!("{base_url}/chat/completions");
    let mut req = http.post(&url).json(request);
    // Local backends (Ollama, llama.cpp) run without a key.
    if !api_key.trim().is_empty() {
        req = req.header("Authorization", format!("Bearer {}", api_key.trim()));
    }

    let response = req.send().await?;
    if !response.status().is_success() {
        let code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { code, body });
    }

    response
        .json::<ChatResponse>()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
