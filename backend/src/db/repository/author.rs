//! Author repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Author;

/// Read access to author rows.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Fetch a single author.
    ///
    /// # Returns
    /// * `Ok(Author)` - The author row
    /// * `Err(RepositoryError::NotFound)` - If no author has this id
    /// * `Err(RepositoryError)` - For connection or query failures
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Author>;
}
