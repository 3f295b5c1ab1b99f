use std::collections::HashMap;
use std::sync::RwLock;

use crate::client::ClientId;
use crate::cookies::jar::MemoryCookieJar;
use crate::cookies::store::CookieStore;
use crate::cookies::CookieJarHandle;

/// Non-persisting cookie store: jars live as long as the store does.
#[derive(Default)]
pub struct InMemoryCookieStore {
    /// Cookie jars per client
    jars: RwLock<HashMap<ClientId, CookieJarHandle>>,
}

impl InMemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for InMemoryCookieStore {
    fn jar_for(&self, client_id: ClientId) -> Option<CookieJarHandle> {
        use std::collections::hash_map::Entry;

        let mut jars = self.jars.write().unwrap();
        let handle = match jars.entry(client_id) {
            Entry::Occupied(o) => o.get().clone(),
            Entry::Vacant(v) => {
                let jar_handle = MemoryCookieJar::new().handle();
                v.insert(jar_handle.clone());
                jar_handle
            }
        };
        Some(handle)
    }

    fn persist_client_from_snapshot(&self, _client_id: ClientId, _snapshot: &MemoryCookieJar) {}

    fn remove_client(&self, client_id: ClientId) {
        self.jars.write().unwrap().remove(&client_id);
    }

    fn persist_all(&self) {}
}
