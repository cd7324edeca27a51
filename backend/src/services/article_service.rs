//! Article usecase: deadlines and author enrichment over the repositories.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::db::repository::{
    deadline, ArticleRepository, AuthorRepository, ErrorContext, RepositoryError,
    RepositoryResult,
};
use crate::db::Repositories;
use crate::models::{Article, ArticlePage, Author, NewArticle};

/// Business operations on articles.
///
/// Every returned article has its `author` fully populated. Errors keep the
/// repository taxonomy; a call that outlives the deadline fails with
/// [`RepositoryError::TimeoutError`]. A write that reports a timeout has not
/// changed the store.
#[async_trait]
pub trait ArticleUsecase: Send + Sync {
    /// Page through articles with id greater than `cursor`.
    async fn fetch(&self, cursor: i64, num: i64) -> RepositoryResult<ArticlePage>;

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Article>;

    async fn get_by_title(&self, title: &str) -> RepositoryResult<Article>;

    /// Create an article.
    ///
    /// # Returns
    /// * `Err(RepositoryError::ValidationError)` - If the author does not exist
    /// * `Err(RepositoryError::ConflictError)` - If the title is already taken
    async fn store(&self, article: NewArticle) -> RepositoryResult<Article>;

    /// Replace title, content and author of an existing article.
    async fn update(&self, id: i64, changes: NewArticle) -> RepositoryResult<Article>;

    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    /// Check that the backing store answers.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Production [`ArticleUsecase`] implementation.
#[derive(Clone)]
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    authors: Arc<dyn AuthorRepository>,
    timeout: Duration,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        authors: Arc<dyn AuthorRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            articles,
            authors,
            timeout,
        }
    }

    pub fn from_repositories(repositories: Repositories, timeout: Duration) -> Self {
        Self::new(repositories.articles, repositories.authors, timeout)
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }

    /// Run side-effect-free `fut` until `deadline`. Expiry drops the future,
    /// which cancels the in-flight repository call.
    async fn within_deadline<T, F>(
        &self,
        operation: &'static str,
        deadline: Instant,
        fut: F,
    ) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>> + Send,
    {
        match tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "deadline exceeded"
                );
                Err(RepositoryError::timeout_with_context(
                    format!("{} did not finish within {:?}", operation, self.timeout),
                    ErrorContext::new(operation),
                ))
            }
        }
    }

    /// Run a repository write with `deadline` in scope. The write is awaited to
    /// completion; the repository refuses to commit once the deadline passed.
    async fn write_before<T, F>(
        &self,
        operation: &'static str,
        deadline: Instant,
        write: F,
    ) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>> + Send,
    {
        deadline::scope(deadline, write).await.map_err(|e| {
            if e.is_timeout() {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "deadline exceeded before commit"
                );
                e.with_operation(operation)
            } else {
                e
            }
        })
    }

    /// Replace each article's author reference with the full author row.
    ///
    /// Distinct authors are fetched concurrently; one failed lookup fails the
    /// whole batch.
    async fn fill_author_details(&self, articles: Vec<Article>) -> RepositoryResult<Vec<Article>> {
        let author_ids: BTreeSet<i64> = articles.iter().map(Article::author_id).collect();

        let authors = try_join_all(author_ids.into_iter().map(|id| {
            let repo = Arc::clone(&self.authors);
            async move { repo.get_by_id(id).await }
        }))
        .await?;
        let by_id: HashMap<i64, Author> = authors.into_iter().map(|a| (a.id, a)).collect();

        articles
            .into_iter()
            .map(|mut article| {
                let author = by_id.get(&article.author_id()).cloned().ok_or_else(|| {
                    RepositoryError::internal(format!(
                        "author {} missing after lookup",
                        article.author_id()
                    ))
                })?;
                article.author = author;
                Ok(article)
            })
            .collect()
    }

    async fn fill_one(&self, article: Article) -> RepositoryResult<Article> {
        let mut filled = self.fill_author_details(vec![article]).await?;
        filled
            .pop()
            .ok_or_else(|| RepositoryError::internal("enrichment returned no article"))
    }

    /// Author referenced by a write. A missing author is bad input from the
    /// caller's point of view.
    async fn load_author(&self, author_id: i64, operation: &str) -> RepositoryResult<Author> {
        match self.authors.get_by_id(author_id).await {
            Ok(author) => Ok(author),
            Err(e) if e.is_not_found() => Err(RepositoryError::validation_with_context(
                format!("author {} does not exist", author_id),
                ErrorContext::new(operation)
                    .with_entity("author")
                    .with_entity_id(author_id),
            )),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ArticleUsecase for ArticleService {
    async fn fetch(&self, cursor: i64, num: i64) -> RepositoryResult<ArticlePage> {
        self.within_deadline("fetch_articles", self.deadline(), async {
            let page = self.articles.list(cursor, num).await?;
            let items = self.fill_author_details(page.items).await?;
            Ok(ArticlePage {
                items,
                next_cursor: page.next_cursor,
            })
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Article> {
        self.within_deadline("get_article", self.deadline(), async {
            let article = self.articles.get_by_id(id).await?;
            self.fill_one(article).await
        })
        .await
    }

    async fn get_by_title(&self, title: &str) -> RepositoryResult<Article> {
        self.within_deadline("get_article_by_title", self.deadline(), async {
            let article = self.articles.get_by_title(title).await?;
            self.fill_one(article).await
        })
        .await
    }

    async fn store(&self, article: NewArticle) -> RepositoryResult<Article> {
        let deadline = self.deadline();
        let author = self
            .within_deadline("store_article", deadline, async {
                let author = self.load_author(article.author_id, "store_article").await?;

                match self.articles.get_by_title(&article.title).await {
                    Ok(existing) => Err(RepositoryError::conflict_with_context(
                        format!("an article titled '{}' already exists", article.title),
                        ErrorContext::new("store_article")
                            .with_entity("article")
                            .with_entity_id(existing.id),
                    )),
                    Err(e) if e.is_not_found() => Ok(author),
                    Err(e) => Err(e),
                }
            })
            .await?;

        // The write is the last await: a committed row is never reported as
        // timed out.
        let mut created = self
            .write_before("store_article", deadline, self.articles.create(&article))
            .await?;
        debug!(article_id = created.id, author_id = author.id, "article stored");
        created.author = author;
        Ok(created)
    }

    async fn update(&self, id: i64, changes: NewArticle) -> RepositoryResult<Article> {
        let deadline = self.deadline();
        let (article, author) = self
            .within_deadline("update_article", deadline, async {
                let mut article = self.articles.get_by_id(id).await?;
                let author = self.load_author(changes.author_id, "update_article").await?;

                article.title = changes.title;
                article.content = changes.content;
                article.author = Author::reference(author.id);
                Ok((article, author))
            })
            .await?;

        let mut updated = self
            .write_before("update_article", deadline, self.articles.update(&article))
            .await?;
        debug!(article_id = id, "article updated");
        updated.author = author;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.write_before("delete_article", self.deadline(), self.articles.delete(id))
            .await?;
        debug!(article_id = id, "article deleted");
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.within_deadline("health_check", self.deadline(), self.articles.health_check())
            .await
    }
}
