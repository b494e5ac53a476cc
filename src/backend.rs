//! Question-answering backend client.
//!
//! The widget talks to a single endpoint: `POST /ask` with
//! `{"message": ...}`, answered by `{"answer": ...}`. Language detection and
//! answer generation happen on the backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, WidgetError};

/// Request body for `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// User message content.
    pub message: String,
}

/// Response body of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Answer text, possibly containing URLs.
    pub answer: String,
    /// Language the backend detected, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// Something that can answer a user's question.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AskBackend {
    /// Send one message and return the decoded reply.
    async fn ask(&self, message: &str) -> Result<AskResponse>;
}

/// Build the HTTP client shared by the resource source and the backend.
///
/// Browsers manage their own fetch timeouts, so `timeout` only applies on
/// native targets.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let builder = reqwest::Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = match timeout {
        Some(t) => builder.timeout(t),
        None => builder,
    };
    #[cfg(target_arch = "wasm32")]
    let _ = timeout;
    Ok(builder.build()?)
}

/// [`AskBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAskBackend {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpAskBackend {
    /// Backend answering at `{base}/ask`.
    pub fn new(http: reqwest::Client, base: &Url) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: base.join("/ask")?,
        })
    }

    /// Backend answering at exactly `endpoint`.
    pub fn with_endpoint(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl AskBackend for HttpAskBackend {
    async fn ask(&self, message: &str) -> Result<AskResponse> {
        let body = AskRequest {
            message: message.to_string(),
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WidgetError::Status {
                url: self.endpoint.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        let answer: AskResponse = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            answer_length = answer.answer.len(),
            lang = ?answer.lang,
            "Received answer"
        );
        Ok(answer)
    }
}
