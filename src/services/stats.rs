//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Counters shown on the admin dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_books: i64,
    pub available_books: i64,
    pub active_loans: i64,
    pub total_users: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let (total_books, available_books, active_loans, total_users) = tokio::try_join!(
            self.repository.books.count(),
            self.repository.books.count_available(),
            self.repository.loans.count_active(),
            self.repository.users.count(),
        )?;

        Ok(DashboardStats {
            total_books,
            available_books,
            active_loans,
            total_users,
        })
    }
}
