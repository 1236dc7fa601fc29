use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{ErrorVerbosityProvider, ResourceError},
    extractor::path::ApiPath,
    state::ApiState,
};

use super::{BookErrorType, BookIdPath};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteBookResponse {
    pub detail: String,
}

impl IntoResponse for DeleteBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Removes the first book with the id from the path.
#[utoipa::path(
    delete,
    path = "/{book_id}",
    tag = "books",
    params(
        ("book_id" = uuid::Uuid, Path, description = "Id of the book to delete")
    ),
    responses(
        (status = 200, description = "Book deleted", body = DeleteBookResponse),
        (status = 400, description = "Malformed book id"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<ApiState>,
    ApiPath(BookIdPath { book_id }): ApiPath<BookIdPath>,
) -> Result<DeleteBookResponse, ResourceError<BookErrorType>> {
    match state.books().remove_first_matching(book_id).await {
        Some(_) => {
            tracing::debug!(%book_id, "Deleted book");

            Ok(DeleteBookResponse {
                detail: "Book deleted".to_string(),
            })
        }
        None => {
            tracing::debug!(%book_id, "Book to delete not found");

            Err(ResourceError::new(
                state.error_verbosity(),
                BookErrorType::NotFound { id: book_id },
            ))
        }
    }
}
