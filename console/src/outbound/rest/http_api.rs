//! Reqwest-backed resource adapter.
//!
//! This adapter owns transport details only: URL building, timeout and HTTP
//! error mapping, and JSON encoding and decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::RecordId;
use crate::domain::ports::{Resource, ResourceApi, ResourceApiError};

/// Resource adapter speaking JSON to a conventional REST backend.
#[derive(Debug, Clone)]
pub struct RestResourceApi {
    client: Client,
    base: Url,
}

impl RestResourceApi {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// A base URL without a trailing slash is treated as a directory, so
    /// `http://host/api` and `http://host/api/` address the same resources.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: normalise_base(base),
        })
    }

    /// Base URL every resource path is joined to.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of a collection, or of one record when `id` is given.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the joined URL is invalid.
    pub fn endpoint(&self, resource: Resource, id: Option<RecordId>) -> Result<Url, ResourceApiError> {
        let relative = match id {
            Some(id) => format!("{}{id}", resource.path()),
            None => resource.path().to_owned(),
        };
        self.base
            .join(&relative)
            .map_err(|error| ResourceApiError::transport(format!("invalid {resource} URL: {error}")))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, ResourceApiError> {
        debug!(%method, %url, "resource request");
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        parse_body(bytes.as_ref())
    }
}

#[async_trait]
impl ResourceApi for RestResourceApi {
    async fn get_all(&self, resource: Resource) -> Result<Value, ResourceApiError> {
        let url = self.endpoint(resource, None)?;
        self.send(Method::GET, url, None).await
    }

    async fn post(&self, resource: Resource, body: Value) -> Result<Value, ResourceApiError> {
        let url = self.endpoint(resource, None)?;
        self.send(Method::POST, url, Some(&body)).await
    }

    async fn put(
        &self,
        resource: Resource,
        id: RecordId,
        body: Value,
    ) -> Result<Value, ResourceApiError> {
        let url = self.endpoint(resource, Some(id))?;
        self.send(Method::PUT, url, Some(&body)).await
    }

    async fn delete(&self, resource: Resource, id: RecordId) -> Result<Value, ResourceApiError> {
        let url = self.endpoint(resource, Some(id))?;
        self.send(Method::DELETE, url, None).await
    }
}

fn normalise_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn parse_body(body: &[u8]) -> Result<Value, ResourceApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|error| ResourceApiError::decode(format!("invalid JSON payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> ResourceApiError {
    if error.is_timeout() {
        ResourceApiError::timeout(error.to_string())
    } else if error.is_decode() {
        ResourceApiError::decode(error.to_string())
    } else {
        ResourceApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ResourceApiError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::NOT_FOUND => ResourceApiError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ResourceApiError::timeout(message)
        }
        _ => ResourceApiError::rejected(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
