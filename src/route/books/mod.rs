use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ResourceErrorProvider, types::book::Book};

pub mod app;
pub mod create_book;
pub mod delete_book;
pub mod list_books;
pub mod update_book;

impl IntoResponse for Book {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct BookIdPath {
    pub book_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(tag = "error_type")]
pub enum BookErrorType {
    NotFound {
        #[serde(skip)]
        id: Uuid,
    },
}

#[derive(Debug, Serialize)]
pub struct BookErrorContext {
    pub reason: String,
}

impl ResourceErrorProvider for BookErrorType {
    type Context = BookErrorContext;

    fn headers(&self) -> Option<HeaderMap> {
        None
    }

    fn status_code(&self) -> StatusCode {
        match self {
            BookErrorType::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            BookErrorType::NotFound { .. } => "Book not found",
        }
    }

    fn context(&self) -> Self::Context {
        match self {
            BookErrorType::NotFound { id } => BookErrorContext {
                reason: format!("Book with id {id} not found"),
            },
        }
    }
}
