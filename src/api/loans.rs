//! Loan management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{BorrowRequest, LoanDetails, LoanQuery},
    AppState,
};

use super::{AuthenticatedUser, Path, Query, ValidatedJson};

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans, newest first", body = Vec<LoanDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_admin()?;

    let loans = state.services.loans.list_loans(&query).await?;
    Ok(Json(loans))
}

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/loans/user/{user_id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans, open loans first", body = Vec<LoanDetails>),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_self_or_admin(user_id)?;

    let loans = state.services.loans.get_user_loans(user_id).await?;
    Ok(Json(loans))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 403, description = "Users may only borrow for themselves"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Book is not available")
    )
)]
pub async fn borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state
        .services
        .loans
        .borrow(&claims, request.book_id, request.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Borrow a book (path-parameter form)
#[utoipa::path(
    post,
    path = "/loans/borrow/{book_id}/{user_id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID"),
        ("user_id" = i32, Path, description = "Borrower user ID")
    ),
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 403, description = "Users may only borrow for themselves"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Book is not available")
    )
)]
pub async fn borrow_by_path(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((book_id, user_id)): Path<(i32, i32)>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.loans.borrow(&claims, book_id, user_id).await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/return/{loan_id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("loan_id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LoanDetails),
        (status = 403, description = "Not your loan"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.return_loan(&claims, loan_id).await?;
    Ok(Json(loan))
}
