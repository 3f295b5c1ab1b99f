//! The transport seam between a connector and the wire.
//!
//! [`HttpEngine`] hides the concrete HTTP stack behind an object-safe trait
//! so the connector's cookie policy can be exercised against a scripted
//! engine in tests. [`ReqwestEngine`] is the production implementation.

use std::sync::RwLock;

use async_trait::async_trait;
use http::header::ACCEPT_LANGUAGE;
use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::net::{Request, Response};

/// Blocking-style transport: `send` resolves once the full response has been
/// buffered, or fails with the transport error unchanged. Cancellation and
/// timeouts are the engine's own contract.
#[async_trait]
pub trait HttpEngine: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Response, ClientError>;

    /// Releases pools/handles held by the engine. Idempotent.
    fn shutdown(&self);
}

/// Default engine over a shared [`reqwest::Client`].
///
/// The client is configured once from the [`ClientConfig`] (timeouts, user
/// agent, redirect policy, default headers). reqwest's own cookie store is
/// left disabled: the connector's jar is the only cookie authority, so the
/// null-vs-empty jar distinction stays observable.
pub struct ReqwestEngine {
    /// `None` once [`shutdown`](HttpEngine::shutdown) has run.
    inner: RwLock<Option<reqwest::Client>>,
}

impl ReqwestEngine {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua.clone());
        }

        if let Some(langs) = &config.accept_languages {
            let mut headers = HeaderMap::new();
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(langs)?);
            builder = builder.default_headers(headers);
        }

        builder = if config.max_redirects == 0 {
            builder.redirect(reqwest::redirect::Policy::none())
        } else {
            builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
        };

        Ok(Self {
            inner: RwLock::new(Some(builder.build()?)),
        })
    }
}

#[async_trait]
impl HttpEngine for ReqwestEngine {
    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let client = self
            .inner
            .read()
            .unwrap()
            .clone()
            .ok_or(ClientError::Closed)?;

        debug!("{} {}", request.method, request.url);

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let res = builder.send().await?;

        // Fetch results
        let final_url = res.url().clone();
        let status = res.status().as_u16();
        let status_text = res.status().canonical_reason().unwrap_or("Unknown").to_string();
        let headers = res.headers().clone();

        // Fetch body. We don't do streaming yet
        let body = res.bytes().await?.to_vec();

        Ok(Response {
            url: final_url,
            status,
            status_text,
            headers,
            body,
        })
    }

    fn shutdown(&self) {
        // Dropping the client releases its connection pool.
        self.inner.write().unwrap().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_builds_from_default_config() {
        let config = ClientConfig::default();
        let engine = ReqwestEngine::new(&config).unwrap();
        assert!(engine.inner.read().unwrap().is_some());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let engine = ReqwestEngine::new(&ClientConfig::default()).unwrap();
        engine.shutdown();
        engine.shutdown();
        assert!(engine.inner.read().unwrap().is_none());
    }

    #[tokio::test]
    async fn send_after_shutdown_fails_closed() {
        let engine = ReqwestEngine::new(&ClientConfig::default()).unwrap();
        engine.shutdown();

        let request = Request::get("http://localhost/").unwrap();
        assert!(matches!(engine.send(&request).await, Err(ClientError::Closed)));
    }
}
