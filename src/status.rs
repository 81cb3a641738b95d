//! HTTP status codes as a typed enum.
//!
//! Only the codes this API actually answers with are listed. Use [`Status`]
//! anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or paired with a body as
//! `(Status::Created, Json(value))`.
//!
//! ```rust
//! use prendas::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::NotFound)
//!     .text("prenda no encontrada");
//! ```

/// Status codes produced by the garment API.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201
    NoContent,           // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl Status {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                  => 200,
            Self::Created             => 201,
            Self::NoContent           => 204,
            Self::BadRequest          => 400,
            Self::NotFound            => 404,
            Self::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        match s {
            Status::Ok                  => http::StatusCode::OK,
            Status::Created             => http::StatusCode::CREATED,
            Status::NoContent           => http::StatusCode::NO_CONTENT,
            Status::BadRequest          => http::StatusCode::BAD_REQUEST,
            Status::NotFound            => http::StatusCode::NOT_FOUND,
            Status::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_agree_with_http_crate() {
        for status in [
            Status::Ok,
            Status::Created,
            Status::NoContent,
            Status::BadRequest,
            Status::NotFound,
            Status::InternalServerError,
        ] {
            let code: http::StatusCode = status.into();
            assert_eq!(code.as_u16(), status.as_u16());
        }
    }
}
