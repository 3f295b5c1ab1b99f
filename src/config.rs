//! Client configuration.
//!
//! `ClientConfig` controls the behavior of a single [`Client`](crate::Client):
//! transport limits (timeouts, redirects), identity headers, the cookie
//! handling mode and the XML hardening toggle. A config is immutable once a
//! client has been built from it; in particular the cookie mode is fixed for
//! the lifetime of the connector it configures.
//!
//! `ClientConfig` provides sensible defaults via [`Default`] and a fluent
//! [`ClientConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use courier_client::ClientConfig;
//! let cfg = ClientConfig::default();
//! assert_eq!(cfg.max_redirects, 10);
//! assert!(!cfg.disable_cookies);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use courier_client::ClientConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ClientConfig::builder()
//!     .user_agent("Courier/0.1")
//!     .accept_languages("en-US,en;q=0.9")
//!     .connect_timeout(std::time::Duration::from_secs(10))
//!     .disable_cookies(true)
//!     .build()?; // returns Result<ClientConfig, ConfigError>
//! # Ok(()) }
//! ```

use std::fmt;
use std::time::Duration;

use crate::cookies::CookieStoreHandle;

/// Largest accepted value for `max_redirects`.
const MAX_REDIRECT_LIMIT: u32 = 32;

#[derive(Clone)]
pub struct ClientConfig {
    /// Optional `User-Agent` header sent with every request.
    pub user_agent: Option<String>,
    /// Optional `Accept-Language` header sent with every request.
    pub accept_languages: Option<String>,
    /// Time allowed for establishing a connection.
    pub connect_timeout: Duration,
    /// Total time allowed for one request/response cycle.
    pub request_timeout: Duration,
    /// Redirects followed by the engine; `0` disables following entirely.
    pub max_redirects: u32,
    /// When `true`, the connector never creates a cookie jar: no `Cookie`
    /// header is attached and no `Set-Cookie` header is parsed.
    pub disable_cookies: bool,
    /// When `true`, the XML reader factory expands registered entity
    /// references. Hardening is on by default.
    pub disable_xml_security: bool,
    /// Optional store that mints the per-client cookie jar. When absent and
    /// cookies are enabled, a fresh in-memory jar is used.
    pub cookie_store: Option<CookieStoreHandle>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            accept_languages: None,
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            max_redirects: 10,
            disable_cookies: false,
            disable_xml_security: false,
            cookie_store: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("user_agent", &self.user_agent)
            .field("accept_languages", &self.accept_languages)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_redirects", &self.max_redirects)
            .field("disable_cookies", &self.disable_cookies)
            .field("disable_xml_security", &self.disable_xml_security)
            .field("cookie_store", &self.cookie_store.as_ref().map(|_| "..."))
            .finish()
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Default)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
}

impl ClientConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ClientConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn accept_languages<S: Into<String>>(self, langs: S) -> Self { self.map(|c| c.accept_languages = Some(langs.into())) }
    pub fn connect_timeout(self, t: Duration) -> Self { self.map(|c| c.connect_timeout = t) }
    pub fn request_timeout(self, t: Duration) -> Self { self.map(|c| c.request_timeout = t) }
    pub fn max_redirects(self, n: u32) -> Self { self.map(|c| c.max_redirects = n) }
    pub fn disable_cookies(self, on: bool) -> Self { self.map(|c| c.disable_cookies = on) }
    pub fn disable_xml_security(self, on: bool) -> Self { self.map(|c| c.disable_xml_security = on) }
    pub fn cookie_store(self, store: CookieStoreHandle) -> Self { self.map(|c| c.cookie_store = Some(store)) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ClientConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("connect_timeout must be non-zero")]
    ZeroConnectTimeout,

    #[error("request_timeout must be non-zero")]
    ZeroRequestTimeout,

    #[error("max_redirects {0} is out of range (expected 0..=32)")]
    RedirectLimitExceeded(u32),

    #[error("user_agent must not be empty")]
    EmptyUserAgent,
}

fn validate(c: &ClientConfig) -> Result<(), ConfigError> {
    if c.connect_timeout.is_zero() {
        return Err(ConfigError::ZeroConnectTimeout);
    }
    if c.request_timeout.is_zero() {
        return Err(ConfigError::ZeroRequestTimeout);
    }
    if c.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(ConfigError::RedirectLimitExceeded(c.max_redirects));
    }
    if matches!(&c.user_agent, Some(ua) if ua.is_empty()) {
        return Err(ConfigError::EmptyUserAgent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ClientConfig::builder().build().unwrap();
        assert!(!cfg.disable_cookies);
        assert!(!cfg.disable_xml_security);
        assert!(cfg.cookie_store.is_none());
        assert_eq!(cfg.max_redirects, 10);
    }

    #[test]
    fn rejects_zero_timeouts() {
        let err = ClientConfig::builder()
            .connect_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroConnectTimeout));

        let err = ClientConfig::builder()
            .request_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroRequestTimeout));
    }

    #[test]
    fn rejects_out_of_range_redirects() {
        let err = ClientConfig::builder().max_redirects(100).build().unwrap_err();
        assert!(matches!(err, ConfigError::RedirectLimitExceeded(100)));

        // 0 is legal: it disables redirect following.
        assert!(ClientConfig::builder().max_redirects(0).build().is_ok());
    }

    #[test]
    fn rejects_empty_user_agent() {
        let err = ClientConfig::builder().user_agent("").build().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyUserAgent));
    }
}
