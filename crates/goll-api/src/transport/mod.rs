//! Pluggable wire transport.
//!
//! The coordinator is transport-agnostic: anything that can execute an
//! [`ApiRequest`] and produce a status + JSON body qualifies. HTTP error
//! statuses come back as responses; only failures below HTTP semantics
//! surface as errors.

mod http;
mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::{ApiError, ApiResult};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A request to the backend, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body,
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// A backend response: status plus parsed JSON body (null when empty).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Human-readable message from the body, for error reporting.
    pub fn message(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.body.to_string())
    }

    /// Map a non-success response to the error taxonomy.
    pub(crate) fn into_result(self) -> ApiResult<ApiResponse> {
        match self.status {
            200..=299 => Ok(self),
            400 | 422 => Err(ApiError::Validation(self.message())),
            401 => Err(ApiError::Unauthorized),
            404 => Err(ApiError::NotFound(self.message())),
            500..=599 => Err(ApiError::Server {
                status: self.status,
                message: self.message(),
            }),
            status => Err(ApiError::Api {
                status,
                message: self.message(),
            }),
        }
    }
}

/// Wire transport for backend requests.
///
/// `bearer` is attached as an Authorization credential when present.
/// Implementations must report HTTP-level failures as responses so the
/// coordinator can drive the refresh protocol off the status code.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> BoxFuture<'_, ApiResult<ApiResponse>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse { status, body }
    }

    #[test]
    fn test_status_classification() {
        assert!(response(200, Value::Null).into_result().is_ok());
        assert!(matches!(
            response(401, Value::Null).into_result(),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            response(422, serde_json::json!({"message": "title required"})).into_result(),
            Err(ApiError::Validation(m)) if m == "title required"
        ));
        assert!(matches!(
            response(404, Value::Null).into_result(),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            response(503, Value::Null).into_result(),
            Err(ApiError::Server { status: 503, .. })
        ));
        assert!(matches!(
            response(418, Value::Null).into_result(),
            Err(ApiError::Api { status: 418, .. })
        ));
    }
}
