use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An article author.
///
/// Authors are read-only from the article service's point of view; rows are
/// maintained outside this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Placeholder used before enrichment; carries only the foreign key.
    pub fn reference(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}
