//! Middleware layer.
//!
//! Cross-cutting concerns that wrap handler bodies:
//!
//! - [`with_connection`]: acquire a store connection, run the handler body,
//!   release the connection on every exit path.
//! - `trace`: one log line per request with method, path, status, latency.

mod scope;
pub(crate) mod trace;

pub use scope::{ConnFuture, with_connection};
