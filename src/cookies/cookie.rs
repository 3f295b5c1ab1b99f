//! Cookie core types.
//!
//! This module defines the **type-erased handles** used throughout the crate
//! and the serializable [`Cookie`] data structure.
//!
//! # Concurrency model
//! - [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!   - Callers take a **read lock** for non-mutating operations and a **write
//!     lock** for mutating operations on the underlying jar. The connector
//!     serializes merges through the write lock, which is what makes
//!     last-write-wins per cookie name a well-defined outcome under
//!     concurrent responses.
//! - [`CookieStoreHandle`] is `Arc<dyn CookieStore + Send + Sync>`.
//!   - Stores manage their **own internal synchronization**; the trait
//!     methods take `&self`.
//!
//! # Typical usage
//! ```ignore
//! // Acquire cookies for a request
//! let header = jar.read().unwrap().get_request_cookies(&url);
//!
//! // Store cookies from a response
//! jar.write().unwrap().store_response_cookies(&url, &headers);
//! ```

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::cookies::jar::CookieJar;
use crate::cookies::store::CookieStore;

/// A handle to a cookie jar trait.
///
/// Reference-counted, read/write-locked pointer to a type-erased
/// [`CookieJar`]. The jar is shared between the connector (sole mutator) and
/// introspection callers.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A handle to a cookie store trait.
///
/// Reference-counted pointer to a type-erased [`CookieStore`]. Typical use is
/// at **client-build time** to mint a per-client jar.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// A cookie as stored/serialized by the connector.
///
/// Captures the essential attributes of an HTTP cookie and is suitable for
/// persistence (e.g., JSON) via `serde`. For storage purposes two cookies are
/// the same entry when their names match within one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`). Derived from the request URL when the
    /// `Set-Cookie` header carries no `Path` attribute.
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Raw `Expires` attribute value, if any. Stored, not enforced.
    pub expires: Option<String>,

    /// `Max-Age` attribute in seconds, if any. Stored, not enforced.
    pub max_age: Option<i64>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,

    /// If `true`, cookie is inaccessible to client-side scripts.
    pub http_only: bool,
}

impl Cookie {
    /// A bare `name=value` cookie with no attributes.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            secure: false,
            expires: None,
            max_age: None,
            same_site: None,
            http_only: false,
        }
    }

    /// `name=value` rendering used when building a `Cookie` request header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}
