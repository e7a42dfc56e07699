//! Outbound HTTP used by every adapter.
//!
//! Adapters build a [`Request`] and send it through a shared [`Client`]. The
//! client only forwards to an [`HttpExecutor`], so the transport can be swapped
//! (the binary uses [`ReqwestExecutor`], tests script their own responses).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::common::scraping::Html;
use crate::error::{Result, SourceError};

/// A GET request against an upstream site.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub params: Option<Vec<(String, String)>>,
    pub headers: Option<Vec<(String, String)>>,
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: None,
            headers: None,
            timeout: None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Appends a whole header set, typically one of an adapter's browser
    /// profiles.
    pub fn headers(mut self, headers: &[(&str, &str)]) -> Self {
        let target = self.headers.get_or_insert_with(Vec::new);
        target.extend(headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The request url with its query parameters encoded.
    pub fn full_url(&self) -> Result<String> {
        let Some(params) = &self.params else {
            return Ok(self.url.clone());
        };

        let mut url = url::Url::parse(&self.url).map_err(|source| SourceError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(url.into())
    }

    pub async fn send(self, client: &Client) -> Result<Response> {
        client.request(self).await
    }

    /// Sends the request and parses a successful response as an HTML document.
    pub async fn html(self, client: &Client) -> Result<Html> {
        let response = self.send(client).await?.error_for_status()?;
        Ok(Html::new(&response.text()))
    }

    /// Sends the request and decodes a successful response as JSON.
    pub async fn json<T: DeserializeOwned>(self, client: &Client) -> Result<T> {
        self.send(client).await?.error_for_status()?.json()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub status: u16,
    pub data: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            data: data.into(),
        }
    }

    /// Returns whether the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Throws an error if the response status is not successful (2xx).
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SourceError::Status(self.status))
        }
    }

    /// Body decoded as UTF-8. Invalid sequences are replaced rather than
    /// rejected, since upstream pages occasionally carry stray bytes.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.data)?)
    }
}

#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Handle shared by every adapter. Cloning is cheap; all clones use the same
/// connection pool.
#[derive(Clone)]
pub struct Client {
    executor: Arc<dyn HttpExecutor>,
}

impl Client {
    pub fn new(executor: Arc<dyn HttpExecutor>) -> Self {
        Self { executor }
    }

    pub async fn request(&self, request: Request) -> Result<Response> {
        tracing::info!("Executing HTTP request: method=GET, url={}", request.url);
        self.executor.execute(request).await
    }

    /// Downloads raw bytes, for cover images.
    pub async fn bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = Request::get(url)
            .timeout(timeout)
            .send(self)
            .await?
            .error_for_status()?;
        Ok(response.data)
    }
}

pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl Default for ReqwestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestExecutor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: Request) -> Result<Response> {
        let mut builder = self.client.get(request.full_url()?);

        if let Some(headers) = request.headers {
            for (key, value) in headers {
                builder = builder.header(key, value);
            }
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        map_response(response).await
    }
}

async fn map_response(value: reqwest::Response) -> Result<Response> {
    let status = value.status().as_u16();
    let data = value.bytes().await?.to_vec();

    Ok(Response { status, data })
}
