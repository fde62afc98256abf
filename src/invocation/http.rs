use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::FunctionInvoker;
use crate::errors::InvocationError;
use crate::handlers::ResponseEnvelope;

/// Invokes functions deployed behind an HTTP gateway.
///
/// The event is POSTed as JSON to `{base_url}/{function}`; the reply must be
/// a response envelope.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: Client,
    base_url: Url,
}

impl HttpInvoker {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, InvocationError> {
        // A trailing slash makes Url::join append instead of replacing the last segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| InvocationError::Transport(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| InvocationError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// URL a function is reached at.
    pub fn function_url(&self, function: &str) -> Result<Url, InvocationError> {
        self.base_url
            .join(function)
            .map_err(|e| InvocationError::Transport(format!("Invalid function name '{}': {}", function, e)))
    }
}

#[async_trait]
impl FunctionInvoker for HttpInvoker {
    async fn invoke(&self, function: &str, payload: Value) -> Result<ResponseEnvelope, InvocationError> {
        let url = self.function_url(function)?;
        debug!("Invoking '{}' at {}", function, url);

        let response = self
            .client
            .post(url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| InvocationError::Transport(format!("Failed to reach {}: {}", url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InvocationError::Transport(format!("Failed to read response from {}: {}", url, e)))?;

        match serde_json::from_str::<ResponseEnvelope>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                error!("Function '{}' answered {} with a non-envelope body", function, status);
                Err(InvocationError::InvalidResponse(format!(
                    "HTTP {} from {}: {} ({})",
                    status.as_u16(),
                    function,
                    text,
                    e
                )))
            }
        }
    }
}
