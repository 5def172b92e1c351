use std::sync::Arc;

use parking_lot::RwLock;

use crate::datamodel::{SEED_AUTHORS, SEED_BOOKS};

use super::schema::{Author, Book};

struct Shelves {
    books: Vec<Book>,
    authors: Vec<Author>,
}

/// Shared handle to the in-memory book and author lists.
///
/// The two lists are independent: adding a book never touches `authors`.
/// Cloning the store clones the handle, so every clone sees the same data.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Shelves>>,
}

impl Store {
    pub fn new(books: Vec<Book>, authors: Vec<Author>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Shelves { books, authors })),
        }
    }

    pub fn seeded() -> Self {
        let books = SEED_BOOKS
            .iter()
            .map(|book| Book::new(book.title, book.author))
            .collect();
        let authors = SEED_AUTHORS
            .iter()
            .map(|author| Author::new(author.name))
            .collect();

        Self::new(books, authors)
    }

    pub fn books(&self) -> Vec<Book> {
        self.inner.read().books.clone()
    }

    pub fn authors(&self) -> Vec<Author> {
        self.inner.read().authors.clone()
    }

    /// Appends a book and returns the whole updated list.
    ///
    /// The append and the snapshot happen under the same write lock, so
    /// concurrent callers are applied one at a time and each one sees its
    /// own entry in the returned list.
    pub fn add_book(&self, title: impl Into<String>, author: impl Into<String>) -> Vec<Book> {
        let mut shelves = self.inner.write();
        shelves.books.push(Book::new(title, author));
        shelves.books.clone()
    }
}
