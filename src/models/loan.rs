//! Loan (borrow) model and lifecycle rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Loan status. A loan moves BORROWED -> RETURNED once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
        }
    }

    /// Status after a return, or a conflict if the loan is already closed
    pub fn returned_from(self) -> AppResult<LoanStatus> {
        match self {
            LoanStatus::Borrowed => Ok(LoanStatus::Returned),
            LoanStatus::Returned => Err(AppError::Conflict("Loan already returned".to_string())),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BORROWED" => Ok(LoanStatus::Borrowed),
            "RETURNED" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// Stored as TEXT
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Loan row as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

impl Loan {
    /// Close the loan at `at`; fails if it was already returned
    pub fn mark_returned(&self, at: DateTime<Utc>) -> AppResult<Loan> {
        let status = self.status.returned_from()?;
        Ok(Loan {
            status,
            return_date: Some(at),
            ..self.clone()
        })
    }
}

/// Loan with book title and borrower name, as served to clients
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub user_id: i32,
    pub user_name: String,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Convenience flag mirroring `status == RETURNED`
    #[sqlx(skip)]
    #[serde(default)]
    pub returned: bool,
}

impl LoanDetails {
    /// Fill derived fields after loading
    pub fn finish(mut self) -> Self {
        self.returned = self.status == LoanStatus::Returned;
        self
    }
}

/// Borrow request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: i32,
    pub user_id: i32,
}

/// Loan listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_loan() -> Loan {
        Loan {
            id: 10,
            book_id: 1,
            user_id: 2,
            loan_date: Utc::now(),
            return_date: None,
            status: LoanStatus::Borrowed,
        }
    }

    #[test]
    fn return_closes_an_open_loan_once() {
        let now = Utc::now();
        let returned = open_loan().mark_returned(now).unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(now));

        assert!(matches!(
            returned.mark_returned(Utc::now()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn status_never_goes_back_to_borrowed() {
        assert_eq!(LoanStatus::Borrowed.returned_from().unwrap(), LoanStatus::Returned);
        assert!(LoanStatus::Returned.returned_from().is_err());
    }

    #[test]
    fn details_expose_flat_and_flag_fields() {
        let details = LoanDetails {
            id: 1,
            book_id: 1,
            book_title: "Dune".into(),
            user_id: 2,
            user_name: "Ada".into(),
            loan_date: Utc::now(),
            return_date: Some(Utc::now()),
            status: LoanStatus::Returned,
            returned: false,
        }
        .finish();

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["bookTitle"], "Dune");
        assert_eq!(json["userName"], "Ada");
        assert_eq!(json["status"], "RETURNED");
        assert_eq!(json["returned"], true);
    }

    #[test]
    fn borrow_request_uses_camel_case() {
        let req: BorrowRequest = serde_json::from_str(r#"{"bookId": 3, "userId": 9}"#).unwrap();
        assert_eq!((req.book_id, req.user_id), (3, 9));
    }
}
