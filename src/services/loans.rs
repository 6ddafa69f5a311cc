//! Loan management service

use crate::{
    error::AppResult,
    models::{
        loan::{LoanDetails, LoanQuery},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All loans, optionally filtered by status
    pub async fn list_loans(&self, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(query).await
    }

    /// Loan history for a user
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.get_user_loans(user_id).await
    }

    /// Borrow a book for `user_id`. Users may only borrow for themselves.
    pub async fn borrow(&self, actor: &UserClaims, book_id: i32, user_id: i32) -> AppResult<LoanDetails> {
        actor.require_self_or_admin(user_id)?;

        match self.repository.loans.borrow(book_id, user_id).await {
            Ok(loan) => {
                tracing::info!(loan_id = loan.id, book_id, user_id, by = actor.user_id, "Book borrowed");
                Ok(loan)
            }
            Err(e) => {
                tracing::warn!(book_id, user_id, error = %e, "Borrow rejected");
                Err(e)
            }
        }
    }

    /// Return a loan. Users may only return their own loans.
    pub async fn return_loan(&self, actor: &UserClaims, loan_id: i32) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        actor.require_self_or_admin(loan.user_id)?;

        match self.repository.loans.return_loan(loan_id).await {
            Ok(loan) => {
                tracing::info!(loan_id, book_id = loan.book_id, by = actor.user_id, "Book returned");
                Ok(loan)
            }
            Err(e) => {
                tracing::warn!(loan_id, error = %e, "Return rejected");
                Err(e)
            }
        }
    }
}
