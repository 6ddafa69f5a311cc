//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{author::AuthorRef, category::CategoryRef, like_pattern};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Book row as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub author_id: i32,
    pub category_id: i32,
    /// True iff no BORROWED loan references this book
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// A book can only be lent while no open loan references it
    pub fn ensure_borrowable(&self) -> AppResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Book '{}' is not available",
                self.title
            )))
        }
    }
}

/// Internal row structure for joined book queries
#[derive(Debug, Clone, FromRow)]
pub struct BookDetailsRow {
    id: i32,
    title: String,
    isbn: Option<String>,
    available: bool,
    author_id: i32,
    author_name: String,
    category_id: i32,
    category_name: String,
    created_at: DateTime<Utc>,
}

impl From<BookDetailsRow> for BookDetails {
    fn from(row: BookDetailsRow) -> Self {
        BookDetails {
            id: row.id,
            title: row.title,
            isbn: row.isbn,
            available: row.available,
            author: AuthorRef {
                id: row.author_id,
                name: row.author_name,
            },
            category: CategoryRef {
                id: row.category_id,
                name: row.category_name,
            },
            created_at: row.created_at,
        }
    }
}

/// Book with resolved author and category, as served to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub available: bool,
    pub author: AuthorRef,
    pub category: CategoryRef,
    pub created_at: DateTime<Utc>,
}

/// Book listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author's name
    pub author: Option<String>,
    pub category_id: Option<i32>,
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookQuery {
    /// Clamp pagination into `(limit, offset)`. Pages past the end saturate
    /// the offset and yield an empty page.
    pub fn limit_offset(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (per_page, (page - 1).saturating_mul(per_page))
    }

    /// Trimmed, non-empty title filter as a LIKE pattern
    pub fn title_pattern(&self) -> Option<String> {
        like_pattern(self.title.as_deref())
    }

    pub fn author_pattern(&self) -> Option<String> {
        like_pattern(self.author.as_deref())
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(
        length(min = 1, max = 300, message = "Title is required"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: String,
    #[validate(length(max = 20, message = "ISBN is too long"))]
    pub isbn: Option<String>,
    pub author_id: i32,
    pub category_id: i32,
}

/// Update book request; availability is owned by the loan lifecycle
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(
        length(min = 1, max = 300, message = "Title cannot be empty"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 20, message = "ISBN is too long"))]
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(available: bool) -> Book {
        Book {
            id: 1,
            title: "Dune".into(),
            isbn: None,
            author_id: 1,
            category_id: 1,
            available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_available_books_are_borrowable() {
        assert!(book(true).ensure_borrowable().is_ok());
        match book(false).ensure_borrowable() {
            Err(AppError::Conflict(msg)) => assert!(msg.contains("Dune")),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(BookQuery::default().limit_offset(), (20, 0));

        let query = BookQuery {
            page: Some(3),
            per_page: Some(10),
            ..Default::default()
        };
        assert_eq!(query.limit_offset(), (10, 20));

        let query = BookQuery {
            page: Some(0),
            per_page: Some(10_000),
            ..Default::default()
        };
        assert_eq!(query.limit_offset(), (MAX_PER_PAGE, 0));

        let query = BookQuery {
            page: Some(i64::MAX),
            per_page: Some(20),
            ..Default::default()
        };
        assert_eq!(query.limit_offset(), (20, i64::MAX));

        let query = BookQuery {
            page: Some(i64::MIN),
            per_page: Some(i64::MIN),
            ..Default::default()
        };
        assert_eq!(query.limit_offset(), (1, 0));
    }

    #[test]
    fn blank_titles_are_rejected() {
        let book = CreateBook {
            title: "   ".into(),
            isbn: None,
            author_id: 1,
            category_id: 1,
        };
        let errors = book.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let update = UpdateBook {
            title: Some("\t".into()),
            isbn: None,
            author_id: None,
            category_id: None,
        };
        assert!(update.validate().is_err());

        let untouched = UpdateBook {
            title: None,
            isbn: None,
            author_id: None,
            category_id: None,
        };
        assert!(untouched.validate().is_ok());
    }

    #[test]
    fn search_terms_are_escaped() {
        let query = BookQuery {
            title: Some("  100%_Pure ".into()),
            author: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(query.title_pattern().as_deref(), Some("%100\\%\\_pure%"));
        assert_eq!(query.author_pattern(), None);
    }

    #[test]
    fn details_nest_author_and_category() {
        let details: BookDetails = BookDetailsRow {
            id: 4,
            title: "Solaris".into(),
            isbn: Some("9780156027601".into()),
            available: false,
            author_id: 2,
            author_name: "Stanisław Lem".into(),
            category_id: 9,
            category_name: "Science fiction".into(),
            created_at: Utc::now(),
        }
        .into();

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["author"]["name"], "Stanisław Lem");
        assert_eq!(json["category"]["id"], 9);
        assert_eq!(json["available"], false);
    }
}
