//! Domain entities shared by every layer of the service.

pub mod article;
pub mod author;
pub mod time;

pub use article::{Article, ArticlePage, NewArticle};
pub use author::Author;
pub use time::{from_store_naive, now_truncated, to_store_naive, STORE_TIME_ZONE_NAME};
