use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info};

/// Failure detail a handler leaves on its response for this middleware.
#[derive(Clone, Debug)]
pub struct FailedOutcome {
    pub kind: &'static str,
    pub message: String,
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    match response.extensions().get::<FailedOutcome>() {
        Some(failure) => error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            kind = failure.kind,
            value = %failure.message,
            "Failed to process request"
        ),
        None => info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
    }

    response
}
