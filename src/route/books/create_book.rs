use axum::extract::State;

use crate::{
    extractor::{json::ApiJson, validated::Validated},
    state::ApiState,
    types::book::Book,
};

/// Appends a book and echoes it back.
///
/// The id is taken from the body as is. No uniqueness check is done.
#[utoipa::path(
    post,
    path = "/",
    tag = "books",
    request_body = Book,
    responses(
        (status = 200, description = "Book created", body = Book),
        (status = 422, description = "Body does not match the book schema or breaks its validation rules")
    )
)]
pub async fn create_book(
    State(state): State<ApiState>,
    Validated(ApiJson(book)): Validated<ApiJson<Book>>,
) -> Book {
    state.books().append(book.clone()).await;

    tracing::debug!(id = %book.id, "Created book");

    book
}
