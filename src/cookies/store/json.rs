//! JSON-backed cookie store.
//!
//! `JsonCookieStore` persists **all clients'** cookie jars in a single JSON
//! file on disk. It implements the [`CookieStore`] trait and returns per-client
//! jars wrapped in [`PersistentCookieJar`], so that **every mutation** to a
//! jar triggers a snapshot write back to this store.
//!
//! ### Design
//! - One file for all clients (`CookieStoreFile { clients: HashMap<ClientId,
//!   MemoryCookieJar> }`).
//! - In-memory cache: `jars: RwLock<HashMap<ClientId, CookieJarHandle>>` for
//!   quick reuse.
//! - The store keeps a self handle (`store_self`) so the persistent jars can
//!   call back into `persist_client_from_snapshot`.
//!
//! ### Concurrency
//! - Internally synchronized via `RwLock`s; shared behind a
//!   `CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>`.
//!
//! ### I/O characteristics & caveats
//! - `persist_client_from_snapshot` and `remove_client` **read then rewrite**
//!   the entire JSON file; suitable for small cookie sets.
//! - File writes are not atomic.
//! - All I/O is best-effort: failures are logged, never surfaced into the
//!   request path.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::client::ClientId;
use crate::cookies::jar::MemoryCookieJar;
use crate::cookies::persistent_jar::PersistentCookieJar;
use crate::cookies::store::CookieStore;
use crate::cookies::{CookieJarHandle, CookieStoreHandle};

/// On-disk representation of all clients' cookie jars.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieStoreFile {
    clients: HashMap<ClientId, MemoryCookieJar>,
}

/// A JSON-based cookie store that persists cookies across sessions.
///
/// The store caches per-client jars in memory and loads/saves them to a
/// single JSON file. Jars returned by this store are wrapped in
/// [`PersistentCookieJar`], so that writes automatically trigger persistence
/// to disk.
pub struct JsonCookieStore {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,

    /// Actual list of cookie jars per client
    jars: RwLock<HashMap<ClientId, CookieJarHandle>>,

    /// Self handle, so `PersistentCookieJar` can call back into this store.
    ///
    /// Initialized in [`new`](Self::new) and read-only thereafter.
    store_self: RwLock<Option<CookieStoreHandle>>,
}

impl JsonCookieStore {
    /// Creates (or opens) a JSON cookie store at `path`.
    ///
    /// If the file does not exist, an empty structure is written to disk.
    pub fn new(path: PathBuf) -> Arc<Self> {
        if !path.exists() {
            if let Err(e) = fs::write(&path, b"{\"clients\":{}}") {
                warn!("could not initialize cookie store file {}: {e}", path.display());
            }
        }

        let store = Arc::new(Self {
            path,
            jars: RwLock::new(HashMap::new()),
            store_self: RwLock::new(None),
        });

        {
            let mut self_ref = store.store_self.write().unwrap();
            *self_ref = Some(store.clone() as CookieStoreHandle);
        }

        store
    }

    /// Loads and deserializes the full cookie store file.
    ///
    /// Returns an empty structure if the file is missing or unreadable.
    fn load_file(&self) -> CookieStoreFile {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("could not read cookie store file {}: {e}", self.path.display());
                return CookieStoreFile::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("cookie store file {} is not valid JSON, starting empty: {e}", self.path.display());
            CookieStoreFile::default()
        })
    }

    /// Serializes and writes the full cookie store file (pretty-printed).
    fn save_file(&self, store_file: &CookieStoreFile) {
        let contents = match serde_json::to_string_pretty(store_file) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("could not serialize cookie store: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, contents) {
            warn!("could not write cookie store file {}: {e}", self.path.display());
        }
    }
}

impl CookieStore for JsonCookieStore {
    /// Returns the cookie jar handle for `client_id`, creating it if needed.
    ///
    /// Behavior:
    /// - If a jar for `client_id` exists in the in-memory cache, it is
    ///   returned.
    /// - Otherwise, a serialized jar is loaded from disk (if present) or an
    ///   empty [`MemoryCookieJar`] is created.
    /// - That jar is wrapped in a [`PersistentCookieJar`] bound to this store
    ///   (via `store_self`) so subsequent mutations persist automatically.
    fn jar_for(&self, client_id: ClientId) -> Option<CookieJarHandle> {
        {
            // Fast path: already in memory
            let jars = self.jars.read().unwrap();
            if let Some(jar) = jars.get(&client_id) {
                return Some(jar.clone());
            }
        }

        // Load from disk
        let mut file = self.load_file();
        let jar = file.clients.remove(&client_id).unwrap_or_default();
        let arc_jar: CookieJarHandle = Arc::new(RwLock::new(jar));

        let store = {
            let store_ref = self.store_self.read().unwrap();
            store_ref.as_ref()?.clone()
        };

        // Wrap in PersistentCookieJar
        let persistent: CookieJarHandle = Arc::new(RwLock::new(PersistentCookieJar::new(
            client_id,
            arc_jar,
            store,
        )));

        self.jars.write().unwrap().insert(client_id, persistent.clone());

        Some(persistent)
    }

    /// Persists a snapshot of `client_id`'s jar to disk.
    ///
    /// Called by [`PersistentCookieJar`] after each mutation. Reads the
    /// current file, replaces the client entry, and writes the file back.
    fn persist_client_from_snapshot(&self, client_id: ClientId, snapshot: &MemoryCookieJar) {
        let mut store_file = self.load_file();
        store_file.clients.insert(client_id, snapshot.clone());
        self.save_file(&store_file);
    }

    /// Removes `client_id` from both the in-memory cache and the on-disk file.
    fn remove_client(&self, client_id: ClientId) {
        self.jars.write().unwrap().remove(&client_id);

        let mut file = self.load_file();
        file.clients.remove(&client_id);
        self.save_file(&file);
    }

    /// Persists **all** in-memory jars to disk by snapshotting them.
    ///
    /// Only jars of type [`PersistentCookieJar`] that wrap a
    /// [`MemoryCookieJar`] are snapshotted here. This avoids double-wrapping
    /// and keeps the format stable.
    fn persist_all(&self) {
        let jars = self.jars.read().unwrap();

        let mut file = self.load_file();
        for (client_id, jar) in jars.iter() {
            if let Ok(jar) = jar.read() {
                if let Some(persist) = jar.as_any().downcast_ref::<PersistentCookieJar>() {
                    if let Ok(inner) = persist.inner.read() {
                        if let Some(snapshot) = inner.as_any().downcast_ref::<MemoryCookieJar>() {
                            file.clients.insert(*client_id, snapshot.clone());
                        }
                    }
                }
            }
        }

        self.save_file(&file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::Cookie;
    use url::Url;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn mutations_survive_a_store_reopen() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let id = ClientId::new();
        let url: Url = "https://example.com/".parse().unwrap();

        {
            let store = JsonCookieStore::new(path.clone());
            let jar = store.jar_for(id).unwrap();
            jar.write().unwrap().add(&url, Cookie::new("session", "abc"));
        }

        let reopened = JsonCookieStore::new(path);
        let jar = reopened.jar_for(id).unwrap();
        let cookies = jar.read().unwrap().cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].pair(), "session=abc");
    }

    #[test]
    fn remove_client_forgets_persisted_state() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let id = ClientId::new();
        let url: Url = "https://example.com/".parse().unwrap();

        let store = JsonCookieStore::new(path.clone());
        store
            .jar_for(id)
            .unwrap()
            .write()
            .unwrap()
            .add(&url, Cookie::new("session", "abc"));
        store.remove_client(id);

        let reopened = JsonCookieStore::new(path);
        assert!(reopened.jar_for(id).unwrap().read().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, b"not json at all").unwrap();

        let store = JsonCookieStore::new(path);
        assert!(store.jar_for(ClientId::new()).unwrap().read().unwrap().is_empty());
    }
}
