use std::any::Any;

use http::HeaderMap;
use log::warn;
use url::Url;

use crate::client::ClientId;
use crate::cookies::jar::MemoryCookieJar;
use crate::cookies::{Cookie, CookieJar, CookieJarHandle, CookieStoreHandle};

/// A `CookieJar` decorator that persists changes after each mutation.
///
/// This type is *transparent* for reads but *eagerly* persists after writes.
pub struct PersistentCookieJar {
    /// Client ID associated with this jar (used to address the store).
    client_id: ClientId,
    /// Inner cookie jar that holds the actual cookie state.
    pub inner: CookieJarHandle,
    /// Handle to the cookie store responsible for persistence.
    store_handle: CookieStoreHandle,
}

impl PersistentCookieJar {
    /// Creates a new persistence-enabled wrapper around an existing jar.
    ///
    /// The store will be asked to persist a snapshot after each mutation.
    pub fn new(client_id: ClientId, jar: CookieJarHandle, store_handle: CookieStoreHandle) -> Self {
        Self {
            client_id,
            inner: jar,
            store_handle,
        }
    }

    /// Snapshots the inner jar and persists it to the backing store.
    ///
    /// Persistence is best-effort: a jar that cannot be snapshotted is
    /// logged and skipped, never failing the request/response cycle.
    fn persist(&self) {
        let snapshot = {
            let inner = self.inner.read().unwrap();
            match inner.as_any().downcast_ref::<MemoryCookieJar>() {
                Some(jar) => jar.clone(),
                None => {
                    warn!("cookie jar for client {} is not snapshot-capable, skipping persist", self.client_id);
                    return;
                }
            }
        };

        self.store_handle.persist_client_from_snapshot(self.client_id, &snapshot);
    }
}

impl CookieJar for PersistentCookieJar {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    /// Stores cookies from a response, then persists the updated state.
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) {
        self.inner.write().unwrap().store_response_cookies(url, headers);
        self.persist();
    }

    /// Returns the `Cookie` request header value for `url` without persisting.
    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        self.inner.read().unwrap().get_request_cookies(url)
    }

    fn add(&mut self, url: &Url, cookie: Cookie) {
        self.inner.write().unwrap().add(url, cookie);
        self.persist();
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.inner.read().unwrap().cookies()
    }

    fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Clears all cookies in the jar, then persists the updated state.
    fn clear(&mut self) {
        self.inner.write().unwrap().clear();
        self.persist();
    }

    /// Removes a single cookie by name for `url`, then persists the updated state.
    fn remove_cookie(&mut self, url: &Url, name: &str) {
        self.inner.write().unwrap().remove_cookie(url, name);
        self.persist();
    }
}
