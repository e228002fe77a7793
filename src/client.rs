//! Core HTTP client for the DhanHQ REST API v2.
//!
//! The [`DhanClient`] struct is one authenticated broker session. It wraps
//! [`reqwest::Client`] with the authentication headers of a single
//! [`Credential`] and provides a typed `post` helper.
//!
//! The option chain endpoints are added to `DhanClient` via `impl` blocks in
//! the [`crate::api`] module.

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::constants::{API_BASE_URL, HTTP_TIMEOUT};
use crate::credentials::Credential;
use crate::error::{ApiErrorBody, DhanError, Result};

/// Core HTTP client for the DhanHQ REST API v2.
///
/// Wraps [`reqwest::Client`] and injects the required authentication headers
/// into every request. Auth header values are built once at construction.
///
/// # Example
///
/// ```no_run
/// use dhan_oc_cache::client::DhanClient;
///
/// # fn main() -> dhan_oc_cache::error::Result<()> {
/// let client = DhanClient::new("1000000001", "your-access-token")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DhanClient {
    http: reqwest::Client,
    /// The Dhan client ID (user-specific identification).
    client_id: String,
    /// Base URL for REST API requests (defaults to [`API_BASE_URL`]).
    base_url: String,
    auth_header_token: HeaderValue,
    auth_header_client_id: HeaderValue,
}

impl DhanClient {
    /// Create a new `DhanClient` with the given client ID and access token.
    ///
    /// Uses the default API base URL (`https://api.dhan.co`).
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(client_id, access_token, API_BASE_URL)
    }

    /// Open a session for a pooled credential against `base_url`.
    pub fn for_credential(credential: &Credential, base_url: &str) -> Result<Self> {
        Self::with_base_url(
            credential.client_id(),
            credential.access_token(),
            base_url,
        )
    }

    /// Create a new `DhanClient` pointing at a custom base URL.
    ///
    /// Useful for testing against a sandbox or mock server.
    pub fn with_base_url(
        client_id: impl Into<String>,
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let access_token = access_token.into();
        let client_id = client_id.into();

        let mut auth_header_token = HeaderValue::from_str(&access_token).map_err(|_| {
            DhanError::Config("access token contains invalid header characters".into())
        })?;
        auth_header_token.set_sensitive(true);
        let auth_header_client_id = HeaderValue::from_str(&client_id).map_err(|_| {
            DhanError::Config(format!(
                "client id {client_id:?} contains invalid header characters"
            ))
        })?;

        Ok(Self {
            http,
            client_id,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth_header_token,
            auth_header_client_id,
        })
    }

    /// Returns the Dhan client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform a POST request with a JSON body and deserialize the response.
    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");

        let resp = self
            .http
            .post(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Build the full URL from a path segment.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Default headers applied to every request.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Per-request auth headers from the cached [`HeaderValue`]s.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("access-token", self.auth_header_token.clone());
        headers.insert("client-id", self.auth_header_client_id.clone());
        headers
    }

    /// Read a response, returning either the deserialized body or a `DhanError`.
    async fn handle_response<R: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<R> {
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(DhanError::Json)
        } else {
            let body = String::from_utf8_lossy(&bytes);
            Err(self.parse_error_body(status, &body))
        }
    }

    /// Try to parse the API's JSON error structure; fall back to a raw HTTP
    /// status error.
    fn parse_error_body(&self, status: reqwest::StatusCode, body: &str) -> DhanError {
        if let Ok(api_err) = serde_json::from_str::<ApiErrorBody>(body) {
            if api_err.error_code.is_some() || api_err.error_message.is_some() {
                return DhanError::Api(api_err);
            }
        }
        DhanError::HttpStatus {
            status,
            body: body.to_owned(),
        }
    }
}
