//! Per-request tracing.

use std::time::Instant;

use tracing::{info, warn};

use crate::request::Request;
use crate::response::Response;

pub(crate) struct RequestSpan {
    method: http::Method,
    path: String,
    started: Instant,
}

pub(crate) fn start(req: &Request) -> RequestSpan {
    RequestSpan {
        method: req.method().clone(),
        path: req.path().to_owned(),
        started: Instant::now(),
    }
}

impl RequestSpan {
    pub(crate) fn finish(self, response: &Response) {
        let status = response.status_code().as_u16();
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        if status >= 500 {
            warn!(method = %self.method, path = %self.path, status, elapsed_ms, "request failed");
        } else {
            info!(method = %self.method, path = %self.path, status, elapsed_ms, "request");
        }
    }
}
