use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::{article, author};
use crate::models::{from_store_naive, Article, Author};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = article)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub updated_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = article)]
pub struct NewArticleRow<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: i64,
    pub updated_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = article)]
pub struct ArticleChangeset<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = author)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct AuthorRow {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Result row of `SELECT LAST_INSERT_ID()`.
#[derive(Debug, QueryableByName)]
pub struct LastInsertId {
    #[diesel(sql_type = diesel::sql_types::Unsigned<diesel::sql_types::BigInt>)]
    pub id: u64,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            content: row.content,
            author: Author::reference(row.author_id),
            updated_at: from_store_naive(row.updated_at),
            created_at: from_store_naive(row.created_at),
        }
    }
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            id: row.id,
            name: row.name,
            created_at: from_store_naive(row.created_at),
            updated_at: from_store_naive(row.updated_at),
        }
    }
}
