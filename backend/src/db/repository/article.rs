//! Article repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Article, ArticlePage, NewArticle};

/// Storage operations for articles.
///
/// Returned articles carry only `author.id`; filling in the rest of the
/// author is the service layer's job.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List up to `page_size` articles with an id greater than `cursor`,
    /// ordered by id ascending.
    async fn list(&self, cursor: i64, page_size: i64) -> RepositoryResult<ArticlePage>;

    /// Fetch a single article.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no article has this id
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Article>;

    /// Fetch the article with exactly this title.
    async fn get_by_title(&self, title: &str) -> RepositoryResult<Article>;

    /// Insert a new article.
    ///
    /// # Returns
    /// * `Ok(Article)` - The stored row, with id and timestamps assigned
    /// * `Err(RepositoryError::ConflictError)` - If `author_id` references no author
    async fn create(&self, article: &NewArticle) -> RepositoryResult<Article>;

    /// Overwrite title, content and author of an existing article and bump
    /// `updated_at`.
    async fn update(&self, article: &Article) -> RepositoryResult<Article>;

    /// Delete an article.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no row was deleted
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
