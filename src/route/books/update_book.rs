use axum::extract::State;

use crate::{
    error::{ErrorVerbosityProvider, ResourceError},
    extractor::{json::ApiJson, path::ApiPath, validated::Validated},
    state::ApiState,
    types::book::Book,
};

use super::{BookErrorType, BookIdPath};

/// Replaces the first book with the id from the path.
///
/// The id in the body is not compared with the id in the path.
#[utoipa::path(
    put,
    path = "/{book_id}",
    tag = "books",
    params(
        ("book_id" = uuid::Uuid, Path, description = "Id of the book to replace")
    ),
    request_body = Book,
    responses(
        (status = 200, description = "Book replaced", body = Book),
        (status = 400, description = "Malformed book id"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Body does not match the book schema or breaks its validation rules")
    )
)]
pub async fn update_book(
    State(state): State<ApiState>,
    ApiPath(BookIdPath { book_id }): ApiPath<BookIdPath>,
    Validated(ApiJson(book)): Validated<ApiJson<Book>>,
) -> Result<Book, ResourceError<BookErrorType>> {
    match state.books().replace_first_matching(book_id, book).await {
        Some(book) => {
            tracing::debug!(%book_id, "Updated book");

            Ok(book)
        }
        None => {
            tracing::debug!(%book_id, "Book to update not found");

            Err(ResourceError::new(
                state.error_verbosity(),
                BookErrorType::NotFound { id: book_id },
            ))
        }
    }
}
