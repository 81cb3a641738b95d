//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types side by side, so
//! each one is boxed behind [`ErasedHandler`]:
//!
//! ```text
//! move |req| get_by_code(Arc::clone(&store), req)   ← closure over the store
//!        ↓ router.get("/prendas/{codigo}", …)
//! Arc::new(FnHandler(closure))                      ← BoxedHandler
//!        ↓
//! handler.call(req)  at request time                ← one vtable dispatch
//!        ↓
//! Box::pin(async { fut.await.into_response() })     ← BoxFuture
//! ```
//!
//! Plain `async fn(Request)` items and closures that capture shared state
//! (an `Arc` of the store) both satisfy [`Handler`].
//!
//! Per request the erased path costs one virtual call and one boxed future.
//! The store itself is reached through the closure's own `Arc`, cloned once
//! per call by `api::with_store`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// Pinned because the handler future may borrow from itself across awaits
/// (the connection scope holds `&conn` while the query runs). `Send + 'static`
/// so hyper's connection tasks can run it on any worker thread.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// What the router actually calls.
///
/// Public only because it shows up in [`Handler::into_boxed_handler`]'s
/// return type; nothing outside the crate has a reason to name it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
///
/// The router hands out clones of this to each request, so the captured
/// store handle is never copied, only reference-counted.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Handler ───────────────────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied by anything shaped like
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// where the output is anything [`IntoResponse`] accepts: a [`Response`],
/// a `(Status, Json<T>)` pair, or a `Result` whose error is an `ApiError`.
///
/// Sealed: only the blanket impl below can satisfy it. A closure whose
/// output is not [`IntoResponse`] is rejected at the `router.get(..)` call.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

// Private, so no crate outside this one can implement `Sealed` and therefore
// `Handler`.
mod private {
    pub trait Sealed {}
}

// ── Blanket impls ─────────────────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Owns one concrete handler and adapts it to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
