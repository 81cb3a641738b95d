//! Error types.
//!
//! Two layers:
//!
//! - [`Error`] is for process-level failures: binding the port, reading
//!   configuration, setting up the store. `main` reports it and exits.
//! - [`ApiError`] is what a handler fails with. It always turns into an HTTP
//!   response and never escapes the handler.

use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::response::{IntoResponse, Response};
use crate::status::Status;
use crate::store::StoreError;

/// Message sent when no database connection could be acquired.
pub const CONNECT_FAILED: &str = "Error al conectarse a MongoDB";

/// Infrastructure failures surfaced by [`Server`](crate::Server) and startup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Every way a request can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The store could not hand out a connection.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] StoreError),

    /// The query matched nothing.
    #[error("{0}")]
    NotFound(&'static str),

    /// The request body failed the boundary schema.
    #[error("{message}: {detail}")]
    BadRequest { message: &'static str, detail: String },

    /// The query itself failed.
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Builds an `ApiError::Store` carrying the route's user-facing message.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unavailable(e) => {
                error!(error = %e, "could not acquire a database connection");
                Response::builder()
                    .status(Status::InternalServerError)
                    .text(CONNECT_FAILED)
            }
            ApiError::NotFound(message) => {
                Response::builder().status(Status::NotFound).text(message)
            }
            ApiError::BadRequest { message, detail } => {
                let body = json!({
                    "error": message,
                    "status": Status::BadRequest.as_u16(),
                    "detail": detail,
                });
                Response::builder()
                    .status(Status::BadRequest)
                    .json(body.to_string().into_bytes())
            }
            ApiError::Store { message, source } => {
                error!(error = %source, "{message}");
                Response::builder()
                    .status(Status::InternalServerError)
                    .text(message)
            }
        }
    }
}
