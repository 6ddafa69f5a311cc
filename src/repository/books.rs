//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookDetailsRow, BookQuery, CreateBook, UpdateBook},
};

const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.available, b.created_at,
           a.id AS author_id, a.name AS author_name,
           c.id AS category_id, c.name AS category_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN categories c ON c.id = b.category_id
"#;

const SEARCH_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR LOWER(b.title) LIKE $1)
      AND ($2::text IS NULL OR LOWER(a.name) LIKE $2)
      AND ($3::int IS NULL OR b.category_id = $3)
      AND ($4::bool IS NULL OR b.available = $4)
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book with author and category by ID
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        let row = sqlx::query_as::<_, BookDetailsRow>(&format!("{} WHERE b.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        Ok(row.into())
    }

    /// Search books with filters and pagination, returning the page and the total match count
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let (limit, offset) = query.limit_offset();
        let title = query.title_pattern();
        let author = query.author_pattern();

        let total: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*)
            FROM books b
            JOIN authors a ON a.id = b.author_id
            {}
            "#,
            SEARCH_FILTER
        ))
        .bind(&title)
        .bind(&author)
        .bind(query.category_id)
        .bind(query.available)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, BookDetailsRow>(&format!(
            "{} {} ORDER BY b.title, b.id LIMIT $5 OFFSET $6",
            DETAILS_SELECT, SEARCH_FILTER
        ))
        .bind(&title)
        .bind(&author)
        .bind(query.category_id)
        .bind(query.available)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Create a new book; new books start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<BookDetails> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, isbn, author_id, category_id, available)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id
            "#,
        )
        .bind(book.title.trim())
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.category_id)
        .fetch_one(&self.pool)
        .await?;

        self.get_details(id).await
    }

    /// Update descriptive fields; `available` is left untouched
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<BookDetails> {
        let updated = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                isbn = COALESCE($2, isbn),
                author_id = COALESCE($3, author_id),
                category_id = COALESCE($4, category_id)
            WHERE id = $5
            RETURNING id
            "#,
        )
        .bind(book.title.as_deref().map(str::trim))
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_details(id).await,
            None => Err(AppError::NotFound(format!("Book with id {} not found", id))),
        }
    }

    /// Delete a book unless it is currently on loan
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if !book.available {
            return Err(AppError::Conflict(format!(
                "Book '{}' is on loan and cannot be deleted",
                book.title
            )));
        }

        // Returned loans go with the book (ON DELETE CASCADE)
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE available")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
