pub mod client;
pub mod config;
pub mod connector;
pub mod cookies;
pub mod errors;
pub mod net;
pub mod xml;

pub use client::{Client, ClientBuilder, ClientId};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use connector::{Connector, ConnectorProvider, HttpConnector, HttpConnectorProvider};
pub use errors::ClientError;
pub use net::{Request, Response};
