//! The garment routes.
//!
//! | Method | Path | Answer |
//! |---|---|---|
//! | GET | `/` | 200 welcome text |
//! | GET | `/prendas` | 200 every garment |
//! | GET | `/prendas/{codigo}` | 200 one garment, 404 |
//! | GET | `/prendas/nombre/{nombre}` | 200 name contains, 404 if none |
//! | GET | `/prendas/categoria/{categoria}` | 200 category contains, 404 if none |
//! | GET | `/prendas/precio/{precio}` | 200 price ≥ bound, 404 if none |
//! | POST | `/prendas` | 201 stored garment, 400 |
//! | PATCH | `/prendas/{codigo}` | 200 applied patch, 400, 404 |
//! | DELETE | `/prendas/{codigo}` | 204, 404 |
//! | * | anything else | 404 |
//!
//! Every route that touches the store can also answer 500: with
//! [`CONNECT_FAILED`](crate::CONNECT_FAILED) when no connection is
//! available, or with the route's own message when the query fails.
//!
//! POST and PATCH echo the value that was stored, not the request bytes.
//! Echoes always use the Spanish field names (`codigo`, `nombre`,
//! `categoria`, `precio`) and numeric prices, so a PATCH sent as
//! `{"price":50}` answers `{"precio":50.0}`.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::error::ApiError;
use crate::garment::{Garment, PricePatch, parse_int_prefix};
use crate::handler::Handler;
use crate::middleware::with_connection;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::{Connection, Filter, Store};

pub const WELCOME: &str = "Bienvenido a la API de prendas";
pub const PAGE_NOT_FOUND: &str = "Lo sentimos, la página que buscas no existe.";

pub const LIST_FAILED: &str = "Error al obtener las prendas de la base de datos";
pub const GARMENT_FAILED: &str = "Error al obtener la prenda de la base de datos";
pub const GARMENT_NOT_FOUND: &str = "Prenda no encontrada";
pub const CATEGORY_FAILED: &str = "Error al obtener la categoria de la base de datos";
pub const CATEGORY_NOT_FOUND: &str = "Categoria no encontrada";

pub const CREATE_BAD_FORMAT: &str = "Error en el formato de datos a crear.";
pub const CREATE_FAILED: &str = "Error al intentar agregar una nueva prenda";
pub const UPDATE_BAD_FORMAT: &str = "Error en el formato de datos a modificar.";
pub const UPDATE_FAILED: &str = "Error al modificar la prenda";
pub const DELETE_FAILED: &str = "Error al eliminar la prenda";
pub const CODE_NOT_FOUND: &str = "No se encontró ninguna prenda con el código seleccionado.";

/// Builds the full route table over `store`.
pub fn router<S: Store>(store: S) -> Router {
    let store = Arc::new(store);
    Router::new()
        .get("/", welcome)
        .get("/prendas", with_store(&store, list_all))
        .get("/prendas/{codigo}", with_store(&store, get_by_code))
        .get("/prendas/nombre/{nombre}", with_store(&store, get_by_name))
        .get("/prendas/categoria/{categoria}", with_store(&store, get_by_category))
        .get("/prendas/precio/{precio}", with_store(&store, get_by_min_price))
        .post("/prendas", with_store(&store, create))
        .patch("/prendas/{codigo}", with_store(&store, update_price))
        .delete("/prendas/{codigo}", with_store(&store, remove))
        .fallback(page_not_found)
}

/// Binds a store-aware handler into a plain [`Handler`].
fn with_store<S, F, Fut>(store: &Arc<S>, handler: F) -> impl Handler
where
    S: Store,
    F: Fn(Arc<S>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let store = Arc::clone(store);
    move |req| handler(Arc::clone(&store), req)
}

fn code_param(req: &Request) -> Option<i64> {
    req.param("codigo").and_then(parse_int_prefix)
}

fn text_param(req: &Request, key: &str) -> String {
    req.param(key).unwrap_or_default().to_owned()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn welcome(_req: Request) -> Response {
    Response::text(WELCOME)
}

async fn page_not_found(_req: Request) -> Response {
    Response::builder().status(Status::NotFound).text(PAGE_NOT_FOUND)
}

async fn list_all<S: Store>(store: Arc<S>, _req: Request) -> Response {
    with_connection(&*store, |conn| Box::pin(find_all(conn))).await
}

async fn get_by_code<S: Store>(store: Arc<S>, req: Request) -> Response {
    let code = code_param(&req);
    with_connection(&*store, |conn| Box::pin(find_by_code(conn, code))).await
}

async fn get_by_name<S: Store>(store: Arc<S>, req: Request) -> Response {
    let filter = Filter::NameContains(text_param(&req, "nombre"));
    with_connection(&*store, |conn| {
        Box::pin(find_many(conn, Some(filter), GARMENT_NOT_FOUND, GARMENT_FAILED))
    })
    .await
}

async fn get_by_category<S: Store>(store: Arc<S>, req: Request) -> Response {
    let filter = Filter::CategoryContains(text_param(&req, "categoria"));
    with_connection(&*store, |conn| {
        Box::pin(find_many(conn, Some(filter), CATEGORY_NOT_FOUND, CATEGORY_FAILED))
    })
    .await
}

async fn get_by_min_price<S: Store>(store: Arc<S>, req: Request) -> Response {
    let filter = req
        .param("precio")
        .and_then(parse_int_prefix)
        .map(|bound| Filter::MinPrice(bound as f64));
    with_connection(&*store, |conn| {
        Box::pin(find_many(conn, filter, GARMENT_NOT_FOUND, GARMENT_FAILED))
    })
    .await
}

async fn create<S: Store>(store: Arc<S>, req: Request) -> Response {
    let garment = match parse_garment(&req) {
        Ok(garment) => garment,
        Err(e) => return e.into_response(),
    };
    with_connection(&*store, |conn| Box::pin(insert(conn, garment))).await
}

async fn update_price<S: Store>(store: Arc<S>, req: Request) -> Response {
    let patch = match parse_patch(&req) {
        Ok(patch) => patch,
        Err(e) => return e.into_response(),
    };
    let code = code_param(&req);
    with_connection(&*store, |conn| Box::pin(set_price(conn, code, patch))).await
}

async fn remove<S: Store>(store: Arc<S>, req: Request) -> Response {
    let code = code_param(&req);
    with_connection(&*store, |conn| Box::pin(delete(conn, code))).await
}

// ── Boundary parsing ──────────────────────────────────────────────────────────

fn bad_request(message: &'static str) -> impl Fn(String) -> ApiError {
    move |detail| ApiError::BadRequest { message, detail }
}

fn parse_garment(req: &Request) -> Result<Garment, ApiError> {
    let garment: Garment = req
        .json()
        .map_err(|e| bad_request(CREATE_BAD_FORMAT)(e.to_string()))?;
    garment.validate().map_err(bad_request(CREATE_BAD_FORMAT))?;
    Ok(garment)
}

fn parse_patch(req: &Request) -> Result<PricePatch, ApiError> {
    let patch: PricePatch = req
        .json()
        .map_err(|e| bad_request(UPDATE_BAD_FORMAT)(e.to_string()))?;
    patch.validate().map_err(bad_request(UPDATE_BAD_FORMAT))?;
    Ok(patch)
}

// ── Queries ───────────────────────────────────────────────────────────────────
//
// A code or price that did not parse matches nothing, exactly like a valid
// one that is absent from the collection.

async fn find_all<C: Connection>(conn: &C) -> Result<Response, ApiError> {
    let garments = conn.find(&Filter::All).await.map_err(ApiError::store(LIST_FAILED))?;
    Ok(Json(garments).into_response())
}

async fn find_by_code<C: Connection>(conn: &C, code: Option<i64>) -> Result<Response, ApiError> {
    let Some(code) = code else {
        return Err(ApiError::NotFound(GARMENT_NOT_FOUND));
    };
    let garment = conn
        .find_one(&Filter::Code(code))
        .await
        .map_err(ApiError::store(GARMENT_FAILED))?
        .ok_or(ApiError::NotFound(GARMENT_NOT_FOUND))?;
    Ok(Json(garment).into_response())
}

async fn find_many<C: Connection>(
    conn: &C,
    filter: Option<Filter>,
    not_found: &'static str,
    failed: &'static str,
) -> Result<Response, ApiError> {
    let Some(filter) = filter else {
        return Err(ApiError::NotFound(not_found));
    };
    let garments = conn.find(&filter).await.map_err(ApiError::store(failed))?;
    if garments.is_empty() {
        return Err(ApiError::NotFound(not_found));
    }
    Ok(Json(garments).into_response())
}

async fn insert<C: Connection>(conn: &C, garment: Garment) -> Result<Response, ApiError> {
    conn.insert(&garment).await.map_err(ApiError::store(CREATE_FAILED))?;
    info!(code = garment.code, "Nueva prenda creada");
    Ok((Status::Created, Json(garment)).into_response())
}

async fn set_price<C: Connection>(
    conn: &C,
    code: Option<i64>,
    patch: PricePatch,
) -> Result<Response, ApiError> {
    let Some(code) = code else {
        return Err(ApiError::NotFound(CODE_NOT_FOUND));
    };
    let matched = conn
        .set_price(code, patch.price)
        .await
        .map_err(ApiError::store(UPDATE_FAILED))?;
    if matched == 0 {
        return Err(ApiError::NotFound(CODE_NOT_FOUND));
    }
    info!(code, price = patch.price, "Prenda modificada");
    Ok(Json(patch).into_response())
}

async fn delete<C: Connection>(conn: &C, code: Option<i64>) -> Result<Response, ApiError> {
    let Some(code) = code else {
        return Err(ApiError::NotFound(CODE_NOT_FOUND));
    };
    let deleted = conn.delete(code).await.map_err(ApiError::store(DELETE_FAILED))?;
    if deleted == 0 {
        return Err(ApiError::NotFound(CODE_NOT_FOUND));
    }
    info!(code, "Prenda eliminada");
    Ok(Response::status(Status::NoContent))
}
