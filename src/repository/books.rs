//! Catalog store

use crate::{
    error::{AppError, AppResult},
    models::book::{normalize_isbn, Book},
};

#[derive(Debug, Default, Clone)]
pub struct BooksRepository {
    books: Vec<Book>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookups accept the ISBN with or without separators
    pub fn find_by_isbn(&self, isbn: &str) -> Option<&Book> {
        let isbn = normalize_isbn(isbn);
        self.books.iter().find(|b| b.isbn() == isbn)
    }

    pub fn find_by_isbn_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        let isbn = normalize_isbn(isbn);
        self.books.iter_mut().find(|b| b.isbn() == isbn)
    }

    /// Get book by ISBN
    pub fn get(&self, isbn: &str) -> AppResult<&Book> {
        self.find_by_isbn(isbn)
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    pub fn get_mut(&mut self, isbn: &str) -> AppResult<&mut Book> {
        self.find_by_isbn_mut(isbn)
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    pub fn all(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Add a book, rejecting duplicate ISBNs
    pub fn add(&mut self, book: Book) -> AppResult<()> {
        if self.find_by_isbn(book.isbn()).is_some() {
            return Err(AppError::Conflict(format!(
                "Book with ISBN {} already exists",
                book.isbn()
            )));
        }
        self.books.push(book);
        Ok(())
    }

    pub fn remove(&mut self, isbn: &str) -> AppResult<Book> {
        let key = normalize_isbn(isbn);
        let pos = self
            .books
            .iter()
            .position(|b| b.isbn() == key)
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))?;
        Ok(self.books.remove(pos))
    }

    /// Case-insensitive, stable
    pub fn sort_by_title(&mut self) {
        self.books.sort_by_cached_key(|b| b.title().to_lowercase());
    }

    pub fn replace_all(&mut self, books: Vec<Book>) {
        self.books = books;
    }
}
