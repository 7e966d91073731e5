//! HTTP transport over reqwest.

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::ApiResult;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;
use tracing::debug;

/// Transport that talks to the real backend.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn execute_inner(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> ApiResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = request.method.as_str(), url = %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> BoxFuture<'_, ApiResult<ApiResponse>> {
        self.execute_inner(request, bearer).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let transport = HttpTransport::new("https://api.goll.gg/api/");
        assert_eq!(transport.base_url, "https://api.goll.gg/api");
    }
}
