use std::future::Future;

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Method,
};
use serde::Serialize;

use crate::{LoggerError, Result};

/// Fully resolved HTTP request for one attempt.
///
/// Built fresh for every attempt and handed to the [`Transport`] by value.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
    /// Verify the server's TLS certificate.
    pub verify: bool,
}

impl RequestDescriptor {
    /// Builds a JSON request carrying a bearer `Authorization` header.
    pub fn json<B: Serialize>(
        method: Method,
        url: impl Into<String>,
        api_key: &str,
        body: &B,
        verify: bool,
    ) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&normalize_bearer_authorization(api_key))
            .map_err(|err| LoggerError::InvalidRequest(format!("invalid API key header: {err}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let body = serde_json::to_value(body)
            .map_err(|err| LoggerError::InvalidRequest(format!("unserializable body: {err}")))?;

        Ok(Self {
            method,
            url: url.into(),
            headers,
            body,
            verify,
        })
    }
}

/// Status and raw body of a completed exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into [`LoggerError::Http`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(LoggerError::Http {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Issues one HTTP request.
///
/// Implementations report connection-level problems as
/// [`LoggerError::Network`]; HTTP statuses, successful or not, come back as
/// a [`TransportResponse`].
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse>> + Send;
}

/// [`Transport`] backed by `reqwest` with rustls.
///
/// Every request gets its own client, so no connection outlives a call.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpTransport;

impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!request.verify)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|err| LoggerError::InvalidRequest(err.to_string()))?;

        let response = client
            .request(request.method, &request.url)
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        tracing::debug!(status, url = %request.url, "request completed");

        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> LoggerError {
    if err.is_builder() {
        LoggerError::InvalidRequest(err.to_string())
    } else {
        LoggerError::Network(err.to_string())
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
