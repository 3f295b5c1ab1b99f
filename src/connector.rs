//! Connector layer: [`ConnectorProvider`], [`Connector`] and the reqwest
//! backend.
//!
//! A **connector** performs the actual network transport for the client
//! facade. It is bound to one [`ClientConfig`](crate::ClientConfig) at
//! construction: the cookie handling mode in particular is selected once and
//! never changes for the connector's lifetime.
//!
//! A **connector provider** is the pluggable factory selected by client
//! configuration; it must not share mutable state between the connectors it
//! produces, and is itself reusable across many client builds.

mod engine;
mod http_connector;

pub use engine::HttpEngine;
pub use engine::ReqwestEngine;
pub use http_connector::HttpConnector;
pub use http_connector::HttpConnectorProvider;

use async_trait::async_trait;

use crate::client::ClientId;
use crate::config::ClientConfig;
use crate::cookies::CookieJarHandle;
use crate::errors::ClientError;
use crate::net::{Request, Response};

/// Executes outbound request/response cycles on behalf of one client.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Runs one request/response cycle.
    ///
    /// When cookie handling is enabled, stored cookies matching the target
    /// URL are attached as a single aggregated `Cookie` header before
    /// transport, and `Set-Cookie` response headers are merged into the jar
    /// afterwards (last write wins per cookie name within a scope).
    /// Transport failures are surfaced unchanged; nothing is retried here.
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;

    /// The jar backing this connector's cookie handling.
    ///
    /// `None` iff cookie handling was disabled at construction — a disabled
    /// connector never owns a jar, which is distinct from an enabled
    /// connector whose jar is still empty. Keeps answering with the
    /// last-known state after [`close`](Connector::close).
    fn cookie_jar(&self) -> Option<CookieJarHandle>;

    /// Releases the underlying engine resources. Idempotent; only the first
    /// call has an effect.
    fn close(&self);
}

/// Factory that builds a [`Connector`] for one client from its configuration.
pub trait ConnectorProvider: Send + Sync {
    fn connector(&self, id: ClientId, config: &ClientConfig) -> Result<Box<dyn Connector>, ClientError>;
}
