//! Cookies: [`CookieJar`], [`CookieStore`] and backends.

mod cookie;
mod jar;
mod persistent_jar;
mod store;

pub use cookie::Cookie;
pub use cookie::CookieJarHandle;
pub use cookie::CookieStoreHandle;

pub use jar::CookieJar;
pub use jar::MemoryCookieJar;
pub use persistent_jar::PersistentCookieJar;

pub use store::CookieStore;
pub use store::InMemoryCookieStore;
pub use store::JsonCookieStore;
