//! HTTP session abstraction for the catalog client.
//!
//! The client only needs two verbs: a form `POST` for the login handshake
//! and a `GET` for everything else. Both go through [`HttpSession`] so the
//! authentication logic can be tested without a network. Authentication
//! state lives in the session's cookie jar, which is why a session must be
//! reused for every request after login.

use std::time::Duration;

use async_trait::async_trait;

use super::error::{CatalogError, CatalogResult};
use crate::config::CatalogConfig;

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl HttpReply {
    /// Creates a reply with a JSON content type.
    #[must_use]
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    /// Creates a reply with a plain text content type.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` if the server declared a JSON body.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// One cookie-carrying connection to the catalog service.
#[async_trait]
pub trait HttpSession: Send + Sync {
    /// Sends a URL-encoded form.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> CatalogResult<HttpReply>;

    /// Sends a `GET` request.
    async fn get(&self, url: &str) -> CatalogResult<HttpReply>;
}

/// Creates sessions on demand.
pub trait SessionFactory: Send + Sync {
    /// Opens a fresh session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Transport`] if the HTTP client cannot be built.
    fn open(&self) -> CatalogResult<Box<dyn HttpSession>>;
}

/// Builds [`reqwest`]-backed sessions.
#[derive(Debug, Clone)]
pub struct ReqwestSessionFactory {
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl ReqwestSessionFactory {
    /// Creates a factory with explicit timeouts.
    #[must_use]
    pub const fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            request_timeout,
            connect_timeout,
        }
    }

    /// Creates a factory from catalog settings.
    #[must_use]
    pub const fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.request_timeout(), config.connect_timeout())
    }
}

impl SessionFactory for ReqwestSessionFactory {
    fn open(&self) -> CatalogResult<Box<dyn HttpSession>> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| CatalogError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Box::new(ReqwestSession { client }))
    }
}

struct ReqwestSession {
    client: reqwest::Client,
}

#[async_trait]
impl HttpSession for ReqwestSession {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> CatalogResult<HttpReply> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;
        read_reply(response).await
    }

    async fn get(&self, url: &str) -> CatalogResult<HttpReply> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        read_reply(response).await
    }
}

async fn read_reply(response: reqwest::Response) -> CatalogResult<HttpReply> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(transport_error)?;

    Ok(HttpReply {
        status,
        content_type,
        body,
    })
}

fn transport_error(error: reqwest::Error) -> CatalogError {
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };
    CatalogError::Transport { message }
}
