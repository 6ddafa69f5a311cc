//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Author reference embedded in book representations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorRef {
    pub id: i32,
    pub name: String,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(
        length(min = 1, max = 200, message = "Author name is required"),
        custom(function = "crate::models::not_blank")
    )]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_names_must_have_content() {
        assert!(CreateAuthor { name: "Ursula K. Le Guin".into() }.validate().is_ok());
        assert!(CreateAuthor { name: "".into() }.validate().is_err());

        let errors = CreateAuthor { name: "   ".into() }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
