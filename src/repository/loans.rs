//! Loans repository for database operations
//!
//! Borrow and return run in a single transaction each. The book row (for a
//! borrow) or the loan row (for a return) is locked `FOR UPDATE`, so two
//! concurrent borrows of the same book are serialized and the second one
//! sees `available = false`. The partial unique index
//! `loans_one_borrowed_per_book` backs this up at the schema level.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{Loan, LoanDetails, LoanQuery, LoanStatus},
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_id, b.title AS book_title,
           l.user_id, u.name AS user_name,
           l.loan_date, l.return_date, l.status
    FROM loans l
    JOIN books b ON b.id = l.book_id
    JOIN users u ON u.id = l.user_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan with book title and borrower name
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LoanDetails::finish)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List all loans, newest first
    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE ($1::text IS NULL OR l.status = $1) ORDER BY l.loan_date DESC, l.id DESC",
            DETAILS_SELECT
        ))
        .bind(query.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans.into_iter().map(LoanDetails::finish).collect())
    }

    /// Loan history of a user, open loans first
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.user_id = $1 ORDER BY (l.status = 'BORROWED') DESC, l.loan_date DESC, l.id DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans.into_iter().map(LoanDetails::finish).collect())
    }

    /// Open a loan: requires the book to be available, then marks it unavailable
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<LoanDetails> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        if !user_exists {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        book.ensure_borrowable()?;

        let loan_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loans (book_id, user_id, loan_date, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_details(loan_id).await
    }

    /// Close a loan: requires it to be BORROWED, then makes the book available again
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        let closed = loan.mark_returned(now)?;

        sqlx::query("UPDATE loans SET status = $1, return_date = $2 WHERE id = $3")
            .bind(closed.status)
            .bind(closed.return_date)
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET available = TRUE WHERE id = $1")
            .bind(closed.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_details(loan_id).await
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'BORROWED'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
