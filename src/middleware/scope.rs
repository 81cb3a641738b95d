//! Scoped connection handling.

use std::future::Future;
use std::pin::Pin;

use crate::error::ApiError;
use crate::response::{IntoResponse, Response};
use crate::store::{Connection, Store};

/// Future returned by a handler body; it may borrow the connection.
pub type ConnFuture<'c> = Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send + 'c>>;

/// Runs `body` with a freshly acquired connection.
///
/// If no connection can be acquired the body never runs and the request
/// fails with a 500. Otherwise the connection is released once the body
/// finishes, whatever it returned.
///
/// ```rust,ignore
/// async fn find_all<C: Connection>(conn: &C) -> Result<Response, ApiError> { … }
///
/// with_connection(&*store, |conn| Box::pin(find_all(conn))).await
/// ```
pub async fn with_connection<S, F>(store: &S, body: F) -> Response
where
    S: Store,
    F: for<'c> FnOnce(&'c S::Conn) -> ConnFuture<'c>,
{
    let conn = match store.acquire().await {
        Ok(conn) => conn,
        Err(e) => return ApiError::Unavailable(e).into_response(),
    };

    let result = body(&conn).await;
    conn.release().await;
    result.into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::error::CONNECT_FAILED;
    use crate::garment::Garment;
    use crate::status::Status;
    use crate::store::{Filter, MemoryStore};

    async fn count_all<C: Connection>(conn: &C) -> Result<Response, ApiError> {
        let found = conn.find(&Filter::All).await.map_err(ApiError::store("x"))?;
        Ok(Response::text(found.len().to_string()))
    }

    async fn never_found<C: Connection>(_conn: &C) -> Result<Response, ApiError> {
        Err(ApiError::NotFound("nada"))
    }

    #[tokio::test]
    async fn releases_after_success_and_error() {
        let store = MemoryStore::with_garments([Garment::new(1, "Gorra", "Accesorios", 5.0)]);

        let ok = with_connection(&store, |conn| Box::pin(count_all(conn))).await;
        assert_eq!(ok.status_code(), Status::Ok);
        assert_eq!(ok.body(), b"1");
        assert_eq!(store.open_connections(), 0);

        let not_found = with_connection(&store, |conn| Box::pin(never_found(conn))).await;
        assert_eq!(not_found.status_code(), Status::NotFound);
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn query_failure_still_releases() {
        let store = MemoryStore::new();
        store.set_failing(true);

        let response = with_connection(&store, |conn| Box::pin(count_all(conn))).await;
        assert_eq!(response.status_code(), Status::InternalServerError);
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn body_is_skipped_when_store_is_unreachable() {
        let store = MemoryStore::new();
        store.set_reachable(false);
        let ran = AtomicBool::new(false);

        let response = with_connection(&store, |conn| {
            ran.store(true, Ordering::SeqCst);
            Box::pin(count_all(conn))
        })
        .await;

        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(response.status_code(), Status::InternalServerError);
        assert_eq!(response.body(), CONNECT_FAILED.as_bytes());
    }
}
