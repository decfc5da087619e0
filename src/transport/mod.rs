//! Transport collaborator: authenticated POST of a built request.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::{config::Config, soap::ExecutionRequest};

pub mod xml;

/// Issues one built request and materializes the reply as a tree. Failures
/// (network, non-2xx, auth expiry) propagate untouched; no retries here.
#[async_trait]
pub trait Transport {
    async fn request(&self, request: &ExecutionRequest) -> Result<Value>;
}

#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        // Honor REQUEST_TIMEOUT if present; default 60s
        let timeout_secs = cfg
            .get("REQUEST_TIMEOUT")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: &ExecutionRequest) -> Result<Value> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let resp = self
            .client
            .post(&request.endpoint_url)
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            bail!("executeAnonymous request failed: {} - {}", status, text);
        }

        xml::to_value(&text)
    }
}
