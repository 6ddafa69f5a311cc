//! Catalog management service: books, authors, categories

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor},
        book::{BookDetails, BookQuery, CreateBook, UpdateBook},
        category::{Category, CreateCategory},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    /// Create a book after checking its author and category exist
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookDetails> {
        self.repository.authors.get_by_id(book.author_id).await?;
        self.repository.categories.get_by_id(book.category_id).await?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.id, title = %created.title, "Book created");
        Ok(created)
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<BookDetails> {
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        if let Some(category_id) = book.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book; refused while it is on loan
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        self.repository.authors.create(author.name.trim()).await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn create_category(&self, category: CreateCategory) -> AppResult<Category> {
        self.repository.categories.create(category.name.trim()).await
    }
}
