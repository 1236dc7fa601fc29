use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ErrorVerbosity {
    /// Server returns only the appropriate status code with an empty body.
    ///
    /// Same response as [`ErrorVerbosity::StatusCode`], but the detail message is not generated at all.
    None,
    /// Server returns only the appropriate status code.
    StatusCode,
    /// Server returns only the detail message with the appropriate status code.
    Message,
    /// Server returns the detail message, the error type with cleared error content and the appropriate status code.
    Type,
    /// Server returns the detail message, the error type with the error content and the appropriate status code.
    #[default]
    Full,
}

impl ErrorVerbosity {
    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

pub trait ErrorVerbosityProvider {
    /// Returns the error verbosity.
    fn error_verbosity(&self) -> ErrorVerbosity;
}

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    #[serde(flatten)]
    error: ApiError,
    detail: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiErrorMessage {
    detail: &'static str,
}

impl From<ApiErrorResponse> for ApiErrorMessage {
    fn from(response: ApiErrorResponse) -> Self {
        ApiErrorMessage {
            detail: response.detail,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status_code = self.error.status_code();

        match self.error.verbosity() {
            ErrorVerbosity::None | ErrorVerbosity::StatusCode => status_code.into_response(),
            ErrorVerbosity::Message => {
                (status_code, Json(ApiErrorMessage::from(self))).into_response()
            }
            ErrorVerbosity::Type | ErrorVerbosity::Full => {
                (status_code, Json(self)).into_response()
            }
        }
    }
}

#[derive(Debug, From, Serialize)]
#[serde(tag = "error_type", content = "error")]
/// API error
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when an internal server error occurs.
    InternalServerError(InternalServerError),
    /// Body error
    ///
    /// This error is returned when the body is not as expected.
    Body(BodyError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Validation error
    ///
    /// This error is returned when the extracted data breaks its validation rules.
    Validation(ValidationError),
    /// Method not allowed
    ///
    /// This error is returned when the method is not allowed.
    MethodNotAllowed(MethodNotAllowedError),
    /// Not found error
    ///
    /// This error is returned when no route matches the request.
    NotFound(NotFoundError),
}

impl ApiError {
    fn verbosity(&self) -> ErrorVerbosity {
        match self {
            ApiError::InternalServerError(err) => err.verbosity,
            ApiError::Body(err) => err.verbosity,
            ApiError::Path(err) => err.verbosity,
            ApiError::Validation(err) => err.verbosity,
            ApiError::MethodNotAllowed(err) => err.verbosity,
            ApiError::NotFound(err) => err.verbosity,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InternalServerError(_) => "An internal server error has occurred",
            ApiError::Body(_) => "Failed to parse request body",
            ApiError::Path(_) => "Failed to parse path parameters",
            ApiError::Validation(_) => "Validation failed",
            ApiError::MethodNotAllowed(_) => "Method not allowed",
            ApiError::NotFound(_) => "The requested resource was not found",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(err) => err.status_code(),
            ApiError::Body(err) => err.status_code(),
            ApiError::Path(err) => err.status_code(),
            ApiError::Validation(err) => err.status_code(),
            ApiError::MethodNotAllowed(err) => err.status_code(),
            ApiError::NotFound(err) => err.status_code(),
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let detail = match error.verbosity() {
            ErrorVerbosity::None => "",
            _ => error.message(),
        };

        ApiErrorResponse { error, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiErrorResponse::from(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct InternalServerError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    internal_server_error: Option<String>,
}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        let internal_server_error = verbosity.should_generate_error_reason().then_some(err);

        InternalServerError {
            verbosity,
            internal_server_error,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Serialize)]
pub struct BodyError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    #[serde(skip)]
    status_code: StatusCode,
    body_error_reason: Option<String>,
    body_expected_schema: Option<String>,
}

impl BodyError {
    pub fn from_json_rejection(
        verbosity: ErrorVerbosity,
        json_rejection: JsonRejection,
        body_expected_schema: String,
    ) -> Self {
        // Every body that cannot be turned into `T` is an unprocessable entity,
        // whether it is not JSON at all or is sent without a JSON content type.
        let status_code = match json_rejection {
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => json_rejection.status(),
        };

        let (body_error_reason, body_expected_schema) =
            match verbosity.should_generate_error_reason() {
                true => (Some(json_rejection.body_text()), Some(body_expected_schema)),
                false => (None, None),
            };

        BodyError {
            verbosity,
            status_code,
            body_error_reason,
            body_expected_schema,
        }
    }

    fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

#[derive(Debug, Serialize)]
pub struct PathError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    path_error_reason: Option<String>,
}

impl PathError {
    pub fn from_path_rejection(verbosity: ErrorVerbosity, path_rejection: PathRejection) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then(|| path_rejection.body_text());

        PathError {
            verbosity,
            path_error_reason,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    validation_errors: Option<ValidationErrors>,
}

impl ValidationError {
    pub fn from_validation_errors(verbosity: ErrorVerbosity, errors: ValidationErrors) -> Self {
        let validation_errors = verbosity.should_generate_error_reason().then_some(errors);

        ValidationError {
            verbosity,
            validation_errors,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

#[derive(Debug, Serialize)]
pub struct MethodNotAllowedError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl MethodNotAllowedError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        MethodNotAllowedError { verbosity }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::METHOD_NOT_ALLOWED
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl NotFoundError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        NotFoundError { verbosity }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

/// Describes an error that belongs to a single resource, e.g. a book that does not exist.
///
/// The implementor is serialized as the `error_type` part of the response,
/// so it is expected to be an enum tagged with `#[serde(tag = "error_type")]`.
pub trait ResourceErrorProvider: Serialize {
    type Context: Serialize;

    fn headers(&self) -> Option<HeaderMap>;

    fn status_code(&self) -> StatusCode;

    fn message(&self) -> &'static str;

    fn context(&self) -> Self::Context;
}

#[derive(Debug)]
pub struct ResourceError<T> {
    verbosity: ErrorVerbosity,
    error_type: T,
}

impl<T> ResourceError<T> {
    pub fn new(verbosity: ErrorVerbosity, error_type: T) -> Self {
        ResourceError {
            verbosity,
            error_type,
        }
    }
}

#[derive(Serialize)]
struct ResourceErrorResponse<'a, T, C> {
    detail: &'static str,
    #[serde(flatten)]
    error_type: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<C>,
}

impl<T: ResourceErrorProvider> IntoResponse for ResourceError<T> {
    fn into_response(self) -> Response {
        let status_code = self.error_type.status_code();
        let headers = self.error_type.headers().unwrap_or_default();
        let detail = self.error_type.message();

        match self.verbosity {
            ErrorVerbosity::None | ErrorVerbosity::StatusCode => {
                (status_code, headers).into_response()
            }
            ErrorVerbosity::Message => {
                (status_code, headers, Json(ApiErrorMessage { detail })).into_response()
            }
            ErrorVerbosity::Type => {
                let response = ResourceErrorResponse::<T, T::Context> {
                    detail,
                    error_type: &self.error_type,
                    error: None,
                };

                (status_code, headers, Json(response)).into_response()
            }
            ErrorVerbosity::Full => {
                let response = ResourceErrorResponse {
                    detail,
                    error_type: &self.error_type,
                    error: Some(self.error_type.context()),
                };

                (status_code, headers, Json(response)).into_response()
            }
        }
    }
}
