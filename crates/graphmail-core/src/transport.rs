//! HTTP transport seam between the client core and the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::{GraphRequest, Method};

/// Raw response from the Graph API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl GraphResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Creates a response with a JSON body.
    #[must_use]
    pub fn json_body(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string().into_bytes())
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Converts a failed response into an error, using the Graph error
    /// envelope when present.
    #[must_use]
    pub fn into_error(self, resource: &str) -> Error {
        #[derive(Deserialize)]
        struct Envelope {
            error: ErrorBody,
        }
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            code: String,
            #[serde(default)]
            message: String,
        }

        let (code, message) = serde_json::from_slice::<Envelope>(&self.body).map_or_else(
            |_| (String::new(), String::from_utf8_lossy(&self.body).into_owned()),
            |e| (e.error.code, e.error.message),
        );

        if self.status == 404 {
            return Error::NotFound(resource.to_string());
        }

        Error::Api {
            status: self.status,
            code,
            message,
        }
    }
}

/// Sends Graph requests.
///
/// Implementations perform one network round trip per call and never retry;
/// retry and re-authentication decisions belong to the client.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// Sends `request` with the given bearer token.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn send(&self, request: &GraphRequest, bearer: &str) -> Result<GraphResponse>;
}

/// Transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl GraphTransport for ReqwestTransport {
    async fn send(&self, request: &GraphRequest, bearer: &str) -> Result<GraphResponse> {
        let url = self.url_for(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(bearer)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(method = %request.method, %url, status, "Graph request completed");
        Ok(GraphResponse::new(status, body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_range() {
        assert!(GraphResponse::new(200, Vec::new()).is_success());
        assert!(GraphResponse::new(204, Vec::new()).is_success());
        assert!(!GraphResponse::new(301, Vec::new()).is_success());
        assert!(!GraphResponse::new(401, Vec::new()).is_success());
    }

    #[test]
    fn test_error_envelope_is_decoded() {
        let response = GraphResponse::json_body(
            400,
            &json!({"error": {"code": "ErrorInvalidIdMalformed", "message": "Id is malformed."}}),
        );
        match response.into_error("message abc") {
            Error::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "ErrorInvalidIdMalformed");
                assert_eq!(message, "Id is malformed.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let response = GraphResponse::json_body(
            404,
            &json!({"error": {"code": "ErrorItemNotFound", "message": "not found"}}),
        );
        assert!(matches!(
            response.into_error("message abc"),
            Error::NotFound(resource) if resource == "message abc"
        ));
    }

    #[test]
    fn test_non_json_error_body_kept_as_message() {
        let response = GraphResponse::new(502, b"Bad Gateway".to_vec());
        assert!(matches!(
            response.into_error("x"),
            Error::Api { status: 502, message, .. } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let transport =
            ReqwestTransport::new("https://graph.microsoft.com/v1.0/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            transport.url_for("/users/u/messages"),
            "https://graph.microsoft.com/v1.0/users/u/messages"
        );
    }
}
