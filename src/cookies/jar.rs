//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds all cookies belonging to a single client. The
//! connector passes request/response metadata to the jar so it can update and
//! query cookies appropriately; it is the jar's sole mutator.
//!
//! This module defines the [`CookieJar`] trait and a reference
//! implementation, [`MemoryCookieJar`], which stores cookies **in memory
//! only** (no persistence) and parses a subset of RFC 6265 `Set-Cookie`
//! semantics.
//!
//! ## Notes & limitations
//! - Parsing is intentionally **minimal**: `Path`, `Domain`, `Expires`,
//!   `Max-Age`, `Secure`, `HttpOnly` and `SameSite` are recognized;
//!   expiration enforcement, size limits and eviction are not implemented.
//!   A malformed `Set-Cookie` entry is dropped without failing the
//!   request/response cycle.
//! - Cookies are bucketed by **origin** (`url.origin().ascii_serialization()`).
//!   Within a bucket, host/subdomain and path prefix checks are applied, and
//!   a cookie with an already-present name replaces the existing entry in
//!   place (last write wins, insertion position retained).
//! - This type is **not** internally synchronized. Use it via a
//!   `CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!
//! See also: RFC 6265bis (HTTP State Management Mechanism).

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use http::header::SET_COOKIE;
use http::HeaderMap;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cookies::{Cookie, CookieJarHandle};

/// A cookie jar keeps the cookies for one single client.
///
/// Types implementing this trait encapsulate storage, retrieval, and
/// mutation of cookies according to the URL/headers they receive.
///
/// ### Type erasure
/// `as_any` / `as_any_mut` enable downcasting when callers need access to
/// concrete implementations (e.g., for snapshotting/persistence).
pub trait CookieJar: Send + Sync {
    /// Returns a type-erased reference to the jar.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable type-erased reference to the jar.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Stores cookies found in response `headers` for the given `url`.
    ///
    /// Implementations parse all `Set-Cookie` headers and update existing
    /// entries using "last write wins" semantics when names collide.
    /// Malformed entries are dropped.
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap);

    /// Returns the `Cookie` request header value to send for `url`, if any.
    ///
    /// Implementations filter by domain, path, and the `Secure` flag.
    /// `None` means no cookies match the request.
    fn get_request_cookies(&self, url: &Url) -> Option<String>;

    /// Inserts `cookie` into the scope of `url`, replacing a same-named entry.
    fn add(&mut self, url: &Url, cookie: Cookie);

    /// All cookies in the jar, in deterministic order: origin buckets sorted,
    /// insertion order within a bucket.
    fn cookies(&self) -> Vec<Cookie>;

    /// `true` when the jar holds no cookies at all.
    fn is_empty(&self) -> bool;

    /// Removes all cookies from the jar.
    fn clear(&mut self);

    /// Removes the cookie named `name` associated with `url`, if present.
    fn remove_cookie(&mut self, url: &Url, name: &str);
}

/// In-memory cookie jar holding the cookies of a single client.
///
/// No persistence is performed; see
/// [`PersistentCookieJar`](crate::cookies::PersistentCookieJar) for the
/// write-through variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCookieJar {
    /// Cookies bucketed by origin. A `BTreeMap` keeps enumeration
    /// deterministic for diagnostics and tests.
    entries: BTreeMap<String, Vec<Cookie>>,
}

impl MemoryCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the jar in the shared handle used by connectors.
    pub fn handle(self) -> CookieJarHandle {
        Arc::new(RwLock::new(self))
    }
}

/// Parses one `Set-Cookie` header value. Returns `None` for entries with no
/// `name=value` pair; unrecognized attributes are skipped.
fn parse_set_cookie(raw: &str, default_path: &str) -> Option<Cookie> {
    let (name, rest) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut parts = rest.split(';');
    let value = parts.next().unwrap_or("").trim().to_string();
    let mut cookie = Cookie::new(name, value);

    for part in parts {
        let part = part.trim();
        if let Some((k, v)) = part.split_once('=') {
            let v = v.trim();
            match k.trim().to_ascii_lowercase().as_str() {
                "path" => cookie.path = Some(v.to_string()),
                "domain" => cookie.domain = Some(v.trim_start_matches('.').to_string()),
                "expires" => cookie.expires = Some(v.to_string()),
                // Unparseable Max-Age drops the attribute, not the cookie.
                "max-age" => cookie.max_age = v.parse().ok(),
                "samesite" => {
                    cookie.same_site = Some(if v.eq_ignore_ascii_case("lax") {
                        "Lax".to_string()
                    } else if v.eq_ignore_ascii_case("strict") {
                        "Strict".to_string()
                    } else if v.eq_ignore_ascii_case("none") {
                        "None".to_string()
                    } else {
                        v.to_string()
                    });
                }
                _ => {}
            }
        } else if part.eq_ignore_ascii_case("secure") {
            cookie.secure = true;
        } else if part.eq_ignore_ascii_case("httponly") {
            cookie.http_only = true;
        }
    }

    if cookie.path.is_none() {
        cookie.path = Some(default_path.to_string());
    }

    Some(cookie)
}

/// Default path for cookies without a `Path` attribute, derived from the
/// request URL per RFC 6265 §5.1.4.
fn default_path(url: &Url) -> &str {
    url.path()
        .rsplit_once('/')
        .map_or("/", |(dir, _)| if dir.is_empty() { "/" } else { dir })
}

fn upsert(bucket: &mut Vec<Cookie>, cookie: Cookie) {
    if let Some(existing) = bucket.iter_mut().find(|c| c.name == cookie.name) {
        *existing = cookie;
    } else {
        bucket.push(cookie);
    }
}

impl CookieJar for MemoryCookieJar {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) {
        let origin = url.origin().ascii_serialization();
        let path = default_path(url).to_string();
        let bucket = self.entries.entry(origin).or_default();

        for header in headers.get_all(SET_COOKIE) {
            let Ok(raw) = header.to_str() else {
                debug!("dropping non-ASCII Set-Cookie header for {url}");
                continue;
            };
            match parse_set_cookie(raw, &path) {
                Some(cookie) => upsert(bucket, cookie),
                None => debug!("dropping malformed Set-Cookie header for {url}"),
            }
        }
    }

    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        let origin = url.origin().ascii_serialization();
        let host = url.host_str().unwrap_or_default();
        let path = url.path();
        let is_https = url.scheme() == "https";

        let cookies = self.entries.get(&origin)?;

        let header = cookies
            .iter()
            .filter(|cookie| match &cookie.domain {
                Some(domain) => host == domain || host.ends_with(&format!(".{domain}")),
                None => true,
            })
            .filter(|cookie| match &cookie.path {
                Some(cookie_path) => path.starts_with(cookie_path.as_str()),
                None => true,
            })
            .filter(|cookie| !cookie.secure || is_https)
            .map(Cookie::pair)
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    fn add(&mut self, url: &Url, cookie: Cookie) {
        let origin = url.origin().ascii_serialization();
        upsert(self.entries.entry(origin).or_default(), cookie);
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.entries.values().flatten().cloned().collect()
    }

    fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn remove_cookie(&mut self, url: &Url, name: &str) {
        let origin = url.origin().ascii_serialization();
        if let Some(cookies) = self.entries.get_mut(&origin) {
            cookies.retain(|c| c.name != name);
        }
    }
}
