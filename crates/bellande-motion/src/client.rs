//! HTTP transport and API client

use crate::errors::MotionError;
use crate::types::MotionRequest;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Trait for posting JSON; lets tests swap in a canned transport.
pub trait HttpTransport: Send + Sync {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, MotionError>;
}

/// Blocking reqwest transport
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, MotionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, MotionError> {
        let response = self
            .client
            .post(url)
            .header("accept", "application/json")
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MotionError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(response.json::<Value>()?)
    }
}

/// Sends motion requests to one API endpoint
pub struct MotionClient<T: HttpTransport> {
    transport: T,
    url: String,
}

impl<T: HttpTransport> MotionClient<T> {
    pub fn new(transport: T, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request(&self, request: &MotionRequest) -> Result<Value, MotionError> {
        request.validate()?;
        let payload = request.api_payload()?;
        debug!("POST {}", self.url);
        self.transport.post_json(&self.url, &payload)
    }
}
