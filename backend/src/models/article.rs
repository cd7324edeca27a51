use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::author::Author;

/// A persisted article.
///
/// `author` is not stored as a nested structure: repositories only fill in
/// `author.id` from the `author_id` column and the article service replaces it
/// with the full author row before the article leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Foreign key to the author row.
    pub fn author_id(&self) -> i64 {
        self.author.id
    }
}

/// Insert payload. The store assigns the id and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticlePage {
    pub items: Vec<Article>,
    /// Id of the last item on the page, `None` once the listing is exhausted.
    pub next_cursor: Option<i64>,
}

impl ArticlePage {
    pub fn from_items(items: Vec<Article>) -> Self {
        let next_cursor = items.last().map(|a| a.id);
        Self { items, next_cursor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64) -> Article {
        Article {
            id,
            title: format!("title {id}"),
            content: "content".to_string(),
            author: Author::reference(1),
            updated_at: DateTime::UNIX_EPOCH,
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_page_cursor_is_last_id() {
        let page = ArticlePage::from_items(vec![article(3), article(7)]);
        assert_eq!(page.next_cursor, Some(7));
    }

    #[test]
    fn test_empty_page_has_no_cursor() {
        let page = ArticlePage::from_items(vec![]);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_article_json_field_names() {
        let json = serde_json::to_value(article(1)).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["id", "title", "content", "author", "updated_at", "created_at"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(json["author"]["id"], 1);
    }
}
