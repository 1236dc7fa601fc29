use tokio::sync::Mutex;
use uuid::Uuid;

use crate::types::book::Book;

/// Ordered in-memory collection of [`Book`]s.
///
/// Every operation takes the lock exactly once. Lookups scan from the start
/// and stop at the first record with a matching id, so duplicate ids are
/// allowed but only the first one is reachable by id.
#[derive(Debug, Default)]
pub struct BookStore {
    books: Mutex<Vec<Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
        }
    }

    /// Returns all books in insertion order.
    pub async fn list(&self) -> Vec<Book> {
        self.books.lock().await.clone()
    }

    pub async fn append(&self, book: Book) {
        self.books.lock().await.push(book);
    }

    /// Replaces the first book with the given id in place.
    ///
    /// Returns the new book, or [`None`] if no book has the given id.
    pub async fn replace_first_matching(&self, id: Uuid, book: Book) -> Option<Book> {
        let mut books = self.books.lock().await;

        let slot = books.iter_mut().find(|b| b.id == id)?;
        *slot = book.clone();

        Some(book)
    }

    /// Removes the first book with the given id.
    ///
    /// Returns the removed book, or [`None`] if no book has the given id.
    pub async fn remove_first_matching(&self, id: Uuid) -> Option<Book> {
        let mut books = self.books.lock().await;

        let index = books.iter().position(|b| b.id == id)?;

        Some(books.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.books.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.lock().await.is_empty()
    }
}
