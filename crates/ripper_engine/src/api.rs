use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use ripper_logging::{ripper_debug, ripper_trace};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{ErrorBody, RipRequest};
use crate::{ApiError, CountResponse, FailureKind, RipResponse};

pub const RIP_PATH: &str = "api/v1/rip";
pub const COUNT_PATH: &str = "api/v1/count";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Service root, e.g. `http://localhost:3000`. Endpoint paths are joined onto it.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ApiSettings {
    /// Resolves an endpoint path against `base_url`, keeping any path prefix of the base.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", self.base_url),
            ));
        }
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// The two remote calls the coordinator issues.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn rip(&self, target: &str) -> Result<RipResponse, ApiError>;
    async fn usage_count(&self) -> Result<CountResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        // Fail early on a base url that can never work.
        settings.endpoint(RIP_PATH)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(common_headers())
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ApiError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    /// Best effort: stops at the size cap and keeps whatever arrived before a read error.
    async fn read_error_body(&self, response: reqwest::Response) -> Vec<u8> {
        let max_bytes = self.settings.max_bytes;
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let Ok(chunk) = chunk else { break };
            let room = max_bytes.saturating_sub(bytes.len() as u64) as usize;
            if chunk.len() > room {
                bytes.extend_from_slice(&chunk[..room]);
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        bytes
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = self.read_error_body(response).await;
            ripper_trace!("error status={} body_len={}", status, body.len());
            return Err(service_error(status, &body));
        }
        let body = self.read_body(response).await?;
        ripper_trace!("response status={} body_len={}", status, body.len());
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::MalformedBody, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn rip(&self, target: &str) -> Result<RipResponse, ApiError> {
        let url = self.settings.endpoint(RIP_PATH)?;
        let body = serde_json::to_vec(&RipRequest { target })
            .map_err(|err| ApiError::new(FailureKind::MalformedBody, err.to_string()))?;
        ripper_debug!("POST {} target_len={}", url, target.len());

        let response = self
            .client
            .post(url)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.decode(response).await
    }

    async fn usage_count(&self) -> Result<CountResponse, ApiError> {
        let url = self.settings.endpoint(COUNT_PATH)?;
        ripper_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.decode(response).await
    }
}

fn common_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Failure status: the body's `message` if it has one, otherwise the status text.
fn service_error(status: StatusCode, body: &[u8]) -> ApiError {
    let status_text = status
        .canonical_reason()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| status.as_str().to_string());
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or(status_text);
    ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
        .with_message(message)
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
