//! In-memory repository for development and tests.
//!
//! Mirrors the MySQL schema rules that matter to callers: ids are assigned
//! sequentially, timestamps have whole-second precision, and an article must
//! reference an existing author.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::db::repository::{
    deadline, ArticleRepository, AuthorRepository, ErrorContext, RepositoryError,
    RepositoryResult,
};
use crate::models::{now_truncated, Article, ArticlePage, Author, NewArticle};

#[derive(Default)]
struct LocalData {
    authors: HashMap<i64, Author>,
    // Ordered by id so cursor pagination is a range scan.
    articles: BTreeMap<i64, Article>,
    next_author_id: i64,
    next_article_id: i64,
}

/// Thread-safe in-memory store implementing both repository traits.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an author row. Authors have no write path through the API, so
    /// seeding goes through here.
    pub fn insert_author(&self, name: impl Into<String>) -> Author {
        let mut data = self.data.write();
        data.next_author_id += 1;
        let now = now_truncated();
        let author = Author {
            id: data.next_author_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        };
        data.authors.insert(author.id, author.clone());
        author
    }

    /// Number of stored articles.
    pub fn article_count(&self) -> usize {
        self.data.read().articles.len()
    }

    fn missing_article(operation: &str, id: i64) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("article {} not found", id),
            ErrorContext::new(operation)
                .with_entity("article")
                .with_entity_id(id),
        )
    }

    fn dangling_author(operation: &str, author_id: i64) -> RepositoryError {
        RepositoryError::conflict_with_context(
            format!("author {} does not exist", author_id),
            ErrorContext::new(operation)
                .with_entity("author")
                .with_entity_id(author_id),
        )
    }
}

#[async_trait]
impl AuthorRepository for LocalRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Author> {
        self.data.read().authors.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("author {} not found", id),
                ErrorContext::new("get_author")
                    .with_entity("author")
                    .with_entity_id(id),
            )
        })
    }
}

#[async_trait]
impl ArticleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn list(&self, cursor: i64, page_size: i64) -> RepositoryResult<ArticlePage> {
        let take = usize::try_from(page_size).unwrap_or(0);
        let items: Vec<Article> = self
            .data
            .read()
            .articles
            .range(cursor.saturating_add(1)..)
            .take(take)
            .map(|(_, article)| article.clone())
            .collect();
        Ok(ArticlePage::from_items(items))
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Article> {
        self.data
            .read()
            .articles
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::missing_article("get_article", id))
    }

    async fn get_by_title(&self, title: &str) -> RepositoryResult<Article> {
        self.data
            .read()
            .articles
            .values()
            .find(|a| a.title == title)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("article titled '{}' not found", title),
                    ErrorContext::new("get_article_by_title").with_entity("article"),
                )
            })
    }

    async fn create(&self, article: &NewArticle) -> RepositoryResult<Article> {
        let mut data = self.data.write();
        if !data.authors.contains_key(&article.author_id) {
            return Err(Self::dangling_author("create_article", article.author_id));
        }
        deadline::ensure_before("create_article")?;

        data.next_article_id += 1;
        let now = now_truncated();
        let stored = Article {
            id: data.next_article_id,
            title: article.title.clone(),
            content: article.content.clone(),
            author: Author::reference(article.author_id),
            updated_at: now,
            created_at: now,
        };
        data.articles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, article: &Article) -> RepositoryResult<Article> {
        let mut data = self.data.write();
        if !data.authors.contains_key(&article.author_id()) {
            return Err(Self::dangling_author("update_article", article.author_id()));
        }

        let stored = data
            .articles
            .get_mut(&article.id)
            .ok_or_else(|| Self::missing_article("update_article", article.id))?;
        deadline::ensure_before("update_article")?;
        stored.title = article.title.clone();
        stored.content = article.content.clone();
        stored.author = Author::reference(article.author_id());
        stored.updated_at = now_truncated();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write();
        if !data.articles.contains_key(&id) {
            return Err(Self::missing_article("delete_article", id));
        }
        deadline::ensure_before("delete_article")?;
        data.articles.remove(&id);
        Ok(())
    }
}
