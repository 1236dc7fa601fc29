use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ApiError, ErrorVerbosityProvider, MethodNotAllowedError};

/// Middleware to map axum's `MethodNotAllowed` rejection to our [`ApiError`].
///
/// The `Allow` header set by the router is kept on the mapped response.
pub async fn method_not_allowed<S: ErrorVerbosityProvider>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Response {
    let verbosity = state.error_verbosity();

    let resp = next.run(req).await;

    if resp.status() != StatusCode::METHOD_NOT_ALLOWED {
        return resp;
    }

    let allow = resp.headers().get(header::ALLOW).cloned();

    let mut resp = ApiError::from(MethodNotAllowedError::new(verbosity)).into_response();

    if let Some(allow) = allow {
        resp.headers_mut().insert(header::ALLOW, allow);
    }

    resp
}
