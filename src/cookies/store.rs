//! Cookie store infrastructure.
//!
//! A **cookie store** is a provisioner and persistence layer for per-client
//! cookie jars.
//! - A connector only *holds a [`CookieJarHandle`]*, never a store.
//! - A **CookieStore** can *mint* a jar for a given
//!   [`ClientId`](crate::client::ClientId) and optionally persist/flush all
//!   client jars in one place (e.g., a single JSON file).
//!
//! Typical usage patterns:
//! - Pass a store via [`ClientConfig`](crate::ClientConfig) so the connector
//!   built for that client gets a jar minted from it.
//! - For ephemeral clients, skip the store: cookies then live in a fresh
//!   in-memory jar for the lifetime of the client.
//!
//! ## Design notes
//! - Stores are *only used at build time* to obtain a jar; they are never
//!   consulted on the request path.
//! - Implementations must be `Send + Sync` and safe for concurrent access.
//! - `CookieStore::jar_for(client_id)` should return the *same logical jar
//!   instance* for a client for the lifetime of the store, so all handles
//!   observe consistent state.

mod in_memory;
mod json;

use crate::client::ClientId;
use crate::cookies::jar::MemoryCookieJar;
use crate::cookies::CookieJarHandle;

/// Non-persisting store, one in-memory jar per client.
pub use in_memory::InMemoryCookieStore;
/// File-backed JSON cookie store (one file for all clients).
pub use json::JsonCookieStore;

/// A cookie **store** mints per-client cookie **jars** and (optionally)
/// persists them.
///
/// Implementations must be `Send + Sync` and safe for concurrent use.
pub trait CookieStore: Send + Sync {
    /// Returns (or creates and returns) the cookie jar handle for `client_id`.
    ///
    /// ### Expectations
    /// - Should return the *same logical jar instance* for a given
    ///   `client_id` across calls, so all holders observe consistent state.
    /// - May create the jar lazily on first request.
    /// - Return `None` if the store no longer manages this client or if
    ///   provisioning fails irrecoverably.
    fn jar_for(&self, client_id: ClientId) -> Option<CookieJarHandle>;

    /// Persists the cookie state for `client_id` from a provided snapshot.
    ///
    /// This lets a jar push its current in-memory state (captured in a
    /// [`MemoryCookieJar`] snapshot) into the store without the store holding
    /// a reference to the live jar. Must be **best-effort** and never panic.
    fn persist_client_from_snapshot(&self, client_id: ClientId, snapshot: &MemoryCookieJar);

    /// Removes all persisted cookie data for `client_id` from the store.
    ///
    /// Idempotent; subsequent [`CookieStore::jar_for`] calls may recreate a
    /// fresh, empty jar.
    fn remove_client(&self, client_id: ClientId);

    /// Persists all known client jars to durable storage.
    ///
    /// Called at explicit flush points (e.g., graceful shutdown). Best-effort.
    fn persist_all(&self);
}
