use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;

use crate::error::{ApiError, ErrorVerbosityProvider, InternalServerError};

/// Middleware to trace request and response headers.
pub async fn trace_headers(req: Request, next: Next) -> Response {
    tracing::trace!(method = %req.method(), uri = %req.uri(), headers = ?req.headers(), "Request headers");

    let res = next.run(req).await;

    tracing::trace!(status = %res.status(), headers = ?res.headers(), "Response headers");

    res
}

/// Middleware to trace the response body.
///
/// Buffers the whole body before logging it, so it is only installed when
/// `trace_response_body` is enabled in the config.
pub async fn trace_response_body<S: ErrorVerbosityProvider>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let verbosity = state.error_verbosity();

    let (parts, body) = next.run(req).await.into_parts();

    let bytes = body
        .collect()
        .await
        .map_err(|err| InternalServerError::from_generic_error(verbosity, err))?
        .to_bytes();

    match std::str::from_utf8(&bytes) {
        Ok(body) if !body.is_empty() => tracing::trace!(%body, "Response body"),
        Ok(_) => tracing::trace!("Empty response body"),
        Err(_) => tracing::trace!(len = bytes.len(), "Binary response body"),
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
