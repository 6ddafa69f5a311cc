//! Data models for Shelfmark

pub mod author;
pub mod book;
pub mod category;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetails};
pub use category::Category;
pub use loan::{Loan, LoanDetails, LoanStatus};
pub use user::{Role, User, UserClaims};

use validator::ValidationError;

/// Validation error code for whitespace-only text
pub const BLANK: &str = "blank";

/// Rejects strings that are empty once trimmed; stored names and titles are trimmed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(BLANK));
    }
    Ok(())
}

/// Trimmed, lowercased substring pattern for `LOWER(col) LIKE $n`, with
/// `%`, `_` and `\` escaped. `None` for a missing or blank term.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = term?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}
