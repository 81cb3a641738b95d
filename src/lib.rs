//! # prendas
//!
//! A small HTTP API over a MongoDB collection of garments ("prendas").
//!
//! Clients list, look up, create, re-price and delete garments by numeric
//! code, name, category or minimum price. Every database-backed request
//! acquires one store connection, runs one query, and releases the
//! connection before the response goes out.
//!
//! ## Layout
//!
//! - HTTP plumbing: [`Router`], [`Server`], [`Request`], [`Response`].
//! - [`garment`]: the record and the payloads that modify it.
//! - [`store`]: the [`Store`](store::Store) / [`Connection`](store::Connection)
//!   traits with MongoDB and in-memory backends.
//! - [`middleware`]: scoped connection handling and request tracing.
//! - [`api`]: the route table.
//! - [`config`]: environment configuration.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use prendas::{Config, Server, api, store::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prendas::Error> {
//!     let config = Config::from_env()?;
//!     let app = api::router(MemoryStore::new());
//!     Server::bind(config.addr()).await?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod garment;
pub mod middleware;
pub mod store;

pub use config::Config;
pub use error::{ApiError, CONNECT_FAILED, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
