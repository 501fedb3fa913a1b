use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::models::{Client, ClientId, NewClient};

const CLIENT_PATH: &str = "api/client";
const REFERRER_POLICY: &str = "strict-origin-when-cross-origin";

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised by the client API. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three remote operations the dashboard depends on.
///
/// `ClientApi` talks HTTP; tests substitute an in-memory implementation.
pub trait ClientService {
    async fn create_client(&self, client: &NewClient) -> Result<Client>;
    async fn list_clients(&self) -> Result<Vec<Client>>;
    async fn delete_client(&self, id: &ClientId) -> Result<serde_json::Value>;
}

/// HTTP client for the `/api/client` resource
#[derive(Clone)]
pub struct ClientApi {
    http: reqwest::Client,
    endpoint: Url,
}

impl ClientApi {
    /// Build a client from the loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.request_timeout())
            .build()?;

        Self::with_http(http, config.api_url())
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let raw = format!("{}/{}", base_url.trim_end_matches('/'), CLIENT_PATH);
        let endpoint = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            reason: e.to_string(),
            url: raw,
        })?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn item_url(&self, id: &ClientId) -> Result<Url> {
        let mut url = self.endpoint.clone();
        let id = id.to_string();
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.push(&id);
            }
            Err(()) => {
                return Err(ApiError::InvalidUrl {
                    url: self.endpoint.to_string(),
                    reason: "url cannot be a base".to_string(),
                });
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(%status, %body, "client API request failed");
            return Err(ApiError::Status { status, body });
        }

        Ok(body.to_vec())
    }
}

impl ClientService for ClientApi {
    #[instrument(skip_all, fields(name = %client.name))]
    async fn create_client(&self, client: &NewClient) -> Result<Client> {
        let body = self
            .send(self.http.post(self.endpoint.clone()).json(client))
            .await?;
        let created: Client = serde_json::from_slice(&body)?;
        debug!(id = %created.id, "client created");
        Ok(created)
    }

    #[instrument(skip_all)]
    async fn list_clients(&self) -> Result<Vec<Client>> {
        let body = self.send(self.http.get(self.endpoint.clone())).await?;
        let clients: Vec<Client> = serde_json::from_slice(&body)?;
        debug!(count = clients.len(), "clients fetched");
        Ok(clients)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete_client(&self, id: &ClientId) -> Result<serde_json::Value> {
        let url = self.item_url(id)?;
        let body = self.send(self.http.delete(url)).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static(REFERRER_POLICY),
    );
    headers
}
