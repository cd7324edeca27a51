//! Data Transfer Objects for the HTTP API.
//!
//! Articles are serialized directly from the domain model; this module holds
//! the request shapes and the list envelope.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::error::AppError;
use crate::models::{Article, NewArticle};

/// Page size used when `num` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a client may request; bigger values are clamped.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters of `GET /articles`.
///
/// Kept as strings so malformed numbers produce our own 400 body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArticlesQuery {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub num: Option<String>,
}

impl ListArticlesQuery {
    /// Last-seen id; 0 starts from the beginning.
    pub fn cursor(&self) -> Result<i64, AppError> {
        match non_empty(&self.cursor) {
            None => Ok(0),
            Some(raw) => match raw.parse::<i64>() {
                Ok(cursor) if cursor >= 0 => Ok(cursor),
                _ => Err(AppError::BadRequest(format!(
                    "cursor must be a non-negative integer, got '{}'",
                    raw
                ))),
            },
        }
    }

    pub fn page_size(&self) -> Result<i64, AppError> {
        match non_empty(&self.num) {
            None => Ok(DEFAULT_PAGE_SIZE),
            Some(raw) => match raw.parse::<i64>() {
                Ok(num) if num >= 1 => Ok(num.min(MAX_PAGE_SIZE)),
                _ => Err(AppError::BadRequest(format!(
                    "num must be a positive integer, got '{}'",
                    raw
                ))),
            },
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Body of `GET /articles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub items: Vec<Article>,
    /// Next cursor, empty once the listing is exhausted
    pub cursor: String,
}

/// Nested `{"author": {"id": ..}}` form of the author reference.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorRef {
    pub id: i64,
}

/// Body of `POST /articles` and `PUT /articles/{id}`.
///
/// The author may be given as `author_id`, `authorId` or `author.id`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArticleRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "title is required"),
        length(max = 255, message = "title is longer than 255 characters")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "content is required"))]
    pub content: String,
    #[serde(default, alias = "authorId")]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl ArticleRequest {
    fn resolved_author_id(&self) -> Option<i64> {
        self.author_id.or(self.author.as_ref().map(|a| a.id))
    }

    /// Validate every field and convert to the service payload.
    pub fn into_new_article(self) -> Result<NewArticle, AppError> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let author_id = self.resolved_author_id().filter(|id| *id >= 1);
        if author_id.is_none() {
            errors.add(
                "author_id",
                ValidationError::new("required")
                    .with_message("author id is required and must be positive".into()),
            );
        }

        match author_id {
            Some(author_id) if errors.errors().is_empty() => Ok(NewArticle {
                title: self.title,
                content: self.content,
                author_id,
            }),
            _ => Err(AppError::InvalidBody(errors)),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}
