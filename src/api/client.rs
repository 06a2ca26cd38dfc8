use std::time::Duration;

use reqwest::header::REFERER;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::ApiFailure;
use crate::auth::{self, Credentials};
use crate::config::ClientConfig;

/// One request against the backend, described independently of the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    csrf_token: Option<&'a str>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            csrf_token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiFailure> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiFailure::new(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach the CSRF token. Ignored for safe methods and empty tokens.
    pub fn csrf(mut self, token: &'a str) -> Self {
        if !token.is_empty() {
            self.csrf_token = Some(token);
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Thin HTTP helper: builds requests, sends them and classifies failures.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    timeout: Option<Duration>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiFailure> {
        let base_url = normalize_base_url(&config.base_url);
        Self::with_credentials(base_url, &config.credentials, config.timeout)
    }

    fn with_credentials(
        base_url: Url,
        credentials: &Credentials,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiFailure> {
        let http = reqwest::Client::builder()
            .cookie_provider(credentials.cookie_jar(&base_url))
            .default_headers(credentials.default_headers()?)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiFailure::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiFailure> {
        let trimmed = path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(ApiFailure::new("empty request path"));
        }
        self.base_url
            .join(trimmed)
            .map_err(|e| ApiFailure::new(format!("invalid request path {path}: {e}")))
    }

    pub fn user_path() -> &'static str {
        "/api/user/"
    }

    pub fn crawler_urls_path() -> &'static str {
        "/api/crawler/urls/"
    }

    pub fn crawler_urls_self_path() -> &'static str {
        "/api/crawler/urls/self/"
    }

    pub fn crawler_url_path(id: i64) -> String {
        format!("/api/crawler/urls/{id}/")
    }

    pub fn applications_path() -> &'static str {
        "/api/oauth/applications/"
    }

    pub fn applications_page_path(page: u32) -> String {
        format!("/api/oauth/applications/?page={page}")
    }

    pub fn application_path(client_id: &str) -> String {
        format!(
            "/api/oauth/applications/{}/",
            urlencoding::encode(client_id.trim())
        )
    }

    pub fn authorized_page_path(page: u32) -> String {
        format!("/api/oauth/authorized/?page={page}")
    }

    pub fn authorized_path(id: i64) -> String {
        format!("/api/oauth/authorized/{id}/")
    }

    /// Send a request and decode its JSON body.
    pub async fn call<T>(&self, request: ApiRequest<'_>) -> Result<T, ApiFailure>
    where
        T: DeserializeOwned,
    {
        let bytes = self.send(request).await?;
        serde_json::from_slice::<T>(&bytes).map_err(ApiFailure::decode)
    }

    /// Send a request whose success body is irrelevant (e.g. a 204 delete).
    pub async fn call_no_content(&self, request: ApiRequest<'_>) -> Result<(), ApiFailure> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: ApiRequest<'_>) -> Result<Vec<u8>, ApiFailure> {
        let url = self.endpoint(&request.path)?;
        tracing::debug!(method = %request.method, url = %url, "api request");

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if auth::requires_csrf(&request.method) {
            builder = builder.header(REFERER, self.base_url.as_str());
            if let Some(token) = request.csrf_token {
                builder = builder.header(auth::CSRF_HEADER, token);
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "api transport failure"
            );
            ApiFailure::transport(e)
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiFailure::new(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let failure = ApiFailure::from_response(status, &bytes);
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                message = %failure.message,
                "api request rejected"
            );
            return Err(failure);
        }

        Ok(bytes.to_vec())
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn normalize_base_url(base_url: &Url) -> Url {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}
