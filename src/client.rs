//! Client facade: [`Client`], [`ClientBuilder`] and [`ClientId`].
//!
//! A client is built once from a [`ClientConfig`]; the configured connector
//! provider mints the connector at build time and the config is immutable
//! afterwards. Closing a client releases the connector's engine resources;
//! dropping it closes it implicitly (closing is idempotent).

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::connector::{Connector, ConnectorProvider, HttpConnectorProvider};
use crate::cookies::CookieJarHandle;
use crate::errors::ClientError;
use crate::net::{Request, Response};
use crate::xml::XmlReaderFactory;

/// A unique identifier for a built client, represented as a UUID.
///
/// Keys per-client jars in shared cookie stores and labels log output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for ClientId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An HTTP client bound to one configuration and one connector.
pub struct Client {
    id: ClientId,
    config: ClientConfig,
    connector: Box<dyn Connector>,
}

impl Client {
    /// Entry point to start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs one request/response cycle through the connector.
    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        self.connector.execute(request).await
    }

    /// Convenience GET against a string URL.
    pub async fn get(&self, url: &str) -> Result<Response, ClientError> {
        self.execute(Request::get(url)?).await
    }

    /// The connector serving this client, for introspection.
    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// The jar backing this client's cookie handling; `None` iff cookies
    /// were disabled at build time.
    pub fn cookie_jar(&self) -> Option<CookieJarHandle> {
        self.connector.cookie_jar()
    }

    /// An XML reader factory scoped to this client's configuration.
    ///
    /// Factories are cheap; construct one per logical unit of work and let it
    /// go out of scope when done.
    pub fn xml_reader_factory(&self) -> XmlReaderFactory {
        XmlReaderFactory::new(&self.config)
    }

    /// Releases connector resources. Idempotent; also runs on drop.
    pub fn close(&self) {
        self.connector.close();
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builder wiring a [`ClientConfig`] and a [`ConnectorProvider`] into a
/// [`Client`]. The provider is invoked exactly once, at [`build`](Self::build).
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<ClientConfig>,
    provider: Option<Box<dyn ConnectorProvider>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn connector_provider(mut self, provider: impl ConnectorProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn build(self) -> Result<Client, ClientError> {
        let config = self.config.unwrap_or_default();
        let provider = self
            .provider
            .unwrap_or_else(|| Box::new(HttpConnectorProvider));
        let id = ClientId::new();
        let connector = provider.connector(id, &config)?;

        Ok(Client {
            id,
            config,
            connector,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::InMemoryCookieStore;
    use crate::cookies::CookieStoreHandle;
    use std::sync::Arc;

    #[test]
    fn default_client_has_an_empty_jar() {
        let client = Client::builder().build().unwrap();
        let jar = client.cookie_jar().expect("cookies enabled by default");
        assert!(jar.read().unwrap().is_empty());
    }

    #[test]
    fn disabled_cookies_mean_no_jar_at_all() {
        let config = ClientConfig::builder().disable_cookies(true).build().unwrap();
        let client = Client::builder().config(config).build().unwrap();
        assert!(client.cookie_jar().is_none());
    }

    #[test]
    fn clients_built_from_one_store_get_their_own_jars() {
        let store: CookieStoreHandle = Arc::new(InMemoryCookieStore::new());

        let config_a = ClientConfig::builder().cookie_store(store.clone()).build().unwrap();
        let config_b = ClientConfig::builder().cookie_store(store.clone()).build().unwrap();
        let a = Client::builder().config(config_a).build().unwrap();
        let b = Client::builder().config(config_b).build().unwrap();

        let jar_a = a.cookie_jar().unwrap();
        let jar_b = b.cookie_jar().unwrap();
        assert!(!CookieJarHandle::ptr_eq(&jar_a, &jar_b));

        // The store keeps minting the same jar for the same id.
        assert!(CookieJarHandle::ptr_eq(&jar_a, &store.jar_for(a.id()).unwrap()));
    }

    #[test]
    fn close_twice_does_not_panic() {
        let client = Client::builder().build().unwrap();
        client.close();
        client.close();
        assert!(client.cookie_jar().is_some());
    }
}
