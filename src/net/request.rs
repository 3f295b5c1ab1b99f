use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

use crate::errors::ClientError;

/// Outbound HTTP request consumed by a connector.
///
/// Requests are fully buffered: the optional body is held as raw bytes.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Convenience constructor for a GET request from a string URL.
    pub fn get(url: &str) -> Result<Self, ClientError> {
        Ok(Self::new(Method::GET, Url::parse(url)?))
    }

    /// Convenience constructor for a POST request from a string URL.
    pub fn post(url: &str) -> Result<Self, ClientError> {
        Ok(Self::new(Method::POST, Url::parse(url)?))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(bytes);
        self
    }
}
