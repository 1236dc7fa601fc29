use axum::{extract::State, Json};

use crate::{state::ApiState, types::book::Book};

/// Lists all books in insertion order.
#[utoipa::path(
    get,
    path = "/",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = [Book])
    )
)]
pub async fn list_books(State(state): State<ApiState>) -> Json<Vec<Book>> {
    let books = state.books().list().await;

    tracing::debug!(count = books.len(), "Listed books");

    Json(books)
}
