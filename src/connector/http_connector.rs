use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::header::COOKIE;
use http::HeaderValue;
use log::debug;

use crate::client::ClientId;
use crate::config::ClientConfig;
use crate::connector::engine::{HttpEngine, ReqwestEngine};
use crate::connector::{Connector, ConnectorProvider};
use crate::cookies::{CookieJarHandle, MemoryCookieJar};
use crate::errors::ClientError;
use crate::net::{Request, Response};

/// Cookie handling mode, selected once from configuration at construction.
/// There is no runtime transition between the two.
enum CookiePolicy {
    /// The jar starts empty and is populated lazily by the first response
    /// carrying cookies.
    Enabled(CookieJarHandle),
    /// No jar exists at all: no `Cookie` header is ever attached and no
    /// `Set-Cookie` header is ever parsed.
    Disabled,
}

/// Default connector: cookie policy around an [`HttpEngine`].
///
/// One connector may be invoked concurrently by multiple requests sharing the
/// same client; the jar's lock serializes cookie merges, the engine handles
/// connection-level concurrency itself.
pub struct HttpConnector {
    id: ClientId,
    engine: Box<dyn HttpEngine>,
    policy: CookiePolicy,
    closed: AtomicBool,
}

impl HttpConnector {
    /// Builds a connector over the default reqwest engine.
    pub fn new(id: ClientId, config: &ClientConfig) -> Result<Self, ClientError> {
        let engine = ReqwestEngine::new(config)?;
        Self::with_engine(id, config, Box::new(engine))
    }

    /// Builds a connector over a caller-supplied engine.
    pub fn with_engine(
        id: ClientId,
        config: &ClientConfig,
        engine: Box<dyn HttpEngine>,
    ) -> Result<Self, ClientError> {
        let policy = if config.disable_cookies {
            CookiePolicy::Disabled
        } else {
            let jar = config
                .cookie_store
                .as_ref()
                .and_then(|store| store.jar_for(id))
                .unwrap_or_else(|| MemoryCookieJar::new().handle());
            CookiePolicy::Enabled(jar)
        };

        Ok(Self {
            id,
            engine,
            policy,
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn execute(&self, mut request: Request) -> Result<Response, ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }

        if let CookiePolicy::Enabled(jar) = &self.policy {
            let header = jar.read().unwrap().get_request_cookies(&request.url);
            if let Some(value) = header {
                debug!("client {}: attaching cookies to {}", self.id, request.url);
                request.headers.insert(COOKIE, HeaderValue::from_str(&value)?);
            }
        }

        let response = self.engine.send(&request).await?;

        if let CookiePolicy::Enabled(jar) = &self.policy {
            // Merge against the final URL so redirected responses land in the
            // right scope.
            jar.write().unwrap().store_response_cookies(&response.url, &response.headers);
        }

        Ok(response)
    }

    fn cookie_jar(&self) -> Option<CookieJarHandle> {
        match &self.policy {
            CookiePolicy::Enabled(jar) => Some(jar.clone()),
            CookiePolicy::Disabled => None,
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("client {}: releasing engine", self.id);
            self.engine.shutdown();
        }
    }
}

/// Provider for [`HttpConnector`]; safe to reuse across many client builds.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnectorProvider;

impl ConnectorProvider for HttpConnectorProvider {
    fn connector(&self, id: ClientId, config: &ClientConfig) -> Result<Box<dyn Connector>, ClientError> {
        Ok(Box::new(HttpConnector::new(id, config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::SET_COOKIE;
    use http::HeaderMap;

    /// Scripted engine mirroring a cookie-echo resource: the body is the
    /// value of the request's `name` cookie (or `NO-COOKIE`), and every
    /// response sets `name=value`.
    struct CookieEchoEngine {
        down: AtomicBool,
    }

    impl CookieEchoEngine {
        fn new() -> Self {
            Self {
                down: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl HttpEngine for CookieEchoEngine {
        async fn send(&self, request: &Request) -> Result<Response, ClientError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(ClientError::Closed);
            }

            let echoed = request
                .headers
                .get(COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|raw| {
                    raw.split(';')
                        .map(str::trim)
                        .find_map(|pair| pair.strip_prefix("name="))
                })
                .unwrap_or("NO-COOKIE")
                .to_string();

            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, HeaderValue::from_static("name=value; Path=/"));

            Ok(Response {
                url: request.url.clone(),
                status: 200,
                status_text: "OK".to_string(),
                headers,
                body: echoed.into_bytes(),
            })
        }

        fn shutdown(&self) {
            self.down.store(true, Ordering::SeqCst);
        }
    }

    fn connector(disable_cookies: bool) -> HttpConnector {
        let config = ClientConfig::builder()
            .disable_cookies(disable_cookies)
            .build()
            .unwrap();
        HttpConnector::with_engine(ClientId::new(), &config, Box::new(CookieEchoEngine::new())).unwrap()
    }

    fn request() -> Request {
        Request::get("http://cookies.test/").unwrap()
    }

    #[tokio::test]
    async fn round_trip_stores_and_replays_the_cookie() {
        let connector = connector(false);

        let first = connector.execute(request()).await.unwrap();
        assert_eq!(first.text(), "NO-COOKIE");

        let second = connector.execute(request()).await.unwrap();
        assert_eq!(second.text(), "value");

        let jar = connector.cookie_jar().unwrap();
        let cookies = jar.read().unwrap().cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "value");
    }

    #[tokio::test]
    async fn disabled_mode_never_owns_a_jar() {
        let connector = connector(true);

        // No jar exists, as opposed to an empty one.
        assert!(connector.cookie_jar().is_none());

        let first = connector.execute(request()).await.unwrap();
        assert_eq!(first.text(), "NO-COOKIE");

        // The first response did set a cookie; it must not come back.
        let second = connector.execute(request()).await.unwrap();
        assert_eq!(second.text(), "NO-COOKIE");

        assert!(connector.cookie_jar().is_none());
    }

    #[tokio::test]
    async fn repeated_set_cookie_replaces_in_place() {
        let connector = connector(false);

        connector.execute(request()).await.unwrap();
        connector.execute(request()).await.unwrap();
        connector.execute(request()).await.unwrap();

        let jar = connector.cookie_jar().unwrap();
        assert_eq!(jar.read().unwrap().cookies().len(), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_keeps_jar_state() {
        let connector = connector(false);
        connector.execute(request()).await.unwrap();

        connector.close();
        connector.close();

        assert!(matches!(connector.execute(request()).await, Err(ClientError::Closed)));

        // Introspection still answers with the last-known state.
        let jar = connector.cookie_jar().unwrap();
        assert_eq!(jar.read().unwrap().cookies().len(), 1);
    }

    #[test]
    fn provider_does_not_share_jars_between_connectors() {
        let provider = HttpConnectorProvider;
        let config = ClientConfig::default();

        let a = provider.connector(ClientId::new(), &config).unwrap();
        let b = provider.connector(ClientId::new(), &config).unwrap();

        let jar_a = a.cookie_jar().unwrap();
        let jar_b = b.cookie_jar().unwrap();
        assert!(!CookieJarHandle::ptr_eq(&jar_a, &jar_b));
    }
}
