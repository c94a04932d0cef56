use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PagelistError, Result};
use crate::response::{FetchRequest, FetchResponse};

/// Something that can serve one page of records.
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// Fetches pages from a JSON endpoint.
///
/// GET sends the request as a query string, POST as a JSON body. The body
/// returned by the server is the `{ code, data: { records, total } }`
/// envelope; it is wrapped into a [`FetchResponse`] as-is.
pub struct HttpSource {
    client: Client,
    url: String,
    method: HttpMethod,
    token: Option<String>,
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("url", &self.url)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl HttpSource {
    pub fn new(url: String, method: HttpMethod, timeout: Duration) -> Result<Self> {
        if url.is_empty() {
            return Err(PagelistError::Config("source url is empty".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pagelist")
            .build()?;

        Ok(Self {
            client,
            url,
            method,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn get_url(&self, request: &FetchRequest) -> String {
        let query = request
            .to_query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, sep, query)
    }
}

#[async_trait]
impl Fetcher for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let builder = match self.method {
            HttpMethod::Get => self.client.get(self.get_url(request)),
            HttpMethod::Post => self
                .client
                .post(&self.url)
                .json(&Value::Object(request.to_payload())),
        };
        let builder = match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        };

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PagelistError::Fetch(format!("HTTP {}: {}", status, text)));
        }

        let body: Value = response.json().await?;
        tracing::trace!(url = %self.url, "page body received");
        serde_json::from_value(serde_json::json!({ "data": body }))
            .map_err(|e| PagelistError::Shape(e.to_string()))
    }
}
