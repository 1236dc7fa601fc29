use axum::{
    routing::{get, put},
    Router,
};
use utoipa::OpenApi;

use crate::{state::ApiState, types::book::Book};

use super::{create_book, delete_book, list_books, update_book};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_books::list_books,
        create_book::create_book,
        update_book::update_book,
        delete_book::delete_book,
    ),
    components(schemas(Book, delete_book::DeleteBookResponse)),
    tags((name = "books", description = "Book records"))
)]
pub struct BooksApiDoc;

pub fn app() -> Router<ApiState> {
    Router::<ApiState>::new()
        .route(
            "/",
            get(list_books::list_books).post(create_book::create_book),
        )
        .route(
            "/:book_id",
            put(update_book::update_book).delete(delete_book::delete_book),
        )
}
