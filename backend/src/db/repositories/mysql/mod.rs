//! MySQL repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Session time zone pinned to Asia/Jakarta on every pooled connection
//! - Automatic migration execution
//! - Writes roll back when the caller stops waiting before commit
//!
//! Queries run on the blocking thread pool. Right before a write commits, the
//! blocking closure checks the request deadline and whether the awaiting
//! future was dropped (client gone); either one rolls the transaction back.

use async_trait::async_trait;
use diesel::mysql::MysqlConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::DatabaseSettings;
use crate::db::repository::{
    deadline, ArticleRepository, AuthorRepository, ErrorContext, RepositoryError,
    RepositoryResult,
};
use crate::models::time::STORE_TIME_ZONE_OFFSET;
use crate::models::{now_truncated, to_store_naive, Article, ArticlePage, Author, NewArticle};

mod models;
mod schema;

use models::*;
use schema::{article, author};

type MysqlPool = Pool<ConnectionManager<MysqlConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/mysql/migrations");

/// Configuration for connecting to MySQL.
#[derive(Debug, Clone)]
pub struct MySqlConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl MySqlConfig {
    /// Build the pool configuration from the `database` section of the config file.
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self {
            database_url: settings.connection_url(),
            max_pool_size: settings.max_connections,
            min_pool_size: settings.min_connections,
            connection_timeout_sec: settings.connect_timeout,
            idle_timeout_sec: settings.idle_timeout,
        }
    }
}

/// Pins the session time zone so DATETIME values are read and written as
/// Jakarta wall-clock time.
#[derive(Debug)]
struct SessionTimeZone;

impl CustomizeConnection<MysqlConnection, diesel::r2d2::Error> for SessionTimeZone {
    fn on_acquire(&self, conn: &mut MysqlConnection) -> Result<(), diesel::r2d2::Error> {
        sql_query(format!("SET time_zone = '{}'", STORE_TIME_ZONE_OFFSET))
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Whether the async caller still wants the result of an operation.
#[derive(Clone)]
struct Abandonment {
    dropped: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Abandonment {
    /// Fail if the caller is gone or the request deadline has passed. Called
    /// right before a write commits.
    fn ensure_active(&self, operation: &str) -> RepositoryResult<()> {
        if self.dropped.load(Ordering::SeqCst) {
            return Err(RepositoryError::timeout_with_context(
                "operation abandoned before commit",
                ErrorContext::new(operation),
            ));
        }
        deadline::check(self.deadline, operation)
    }
}

/// Flags the operation as abandoned when the awaiting future is dropped.
struct AbandonOnDrop(Arc<AtomicBool>);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Diesel-backed repository for MySQL.
#[derive(Clone)]
pub struct MySqlRepository {
    pool: MysqlPool,
}

impl std::fmt::Debug for MySqlRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("MySqlRepository")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl MySqlRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(MySqlRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: MySqlConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<MysqlConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .connection_customizer(Box::new(SessionTimeZone))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool })
    }

    fn run_migrations(conn: &mut MysqlConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run a database operation on the blocking pool with a checked-out connection.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MysqlConnection, &Abandonment) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let flag = Arc::new(AtomicBool::new(false));
        let abandonment = Abandonment {
            dropped: Arc::clone(&flag),
            deadline: deadline::current(),
        };
        let checkout_timeout = deadline::remaining();
        let _guard = AbandonOnDrop(flag);

        task::spawn_blocking(move || {
            let checked_out = match checkout_timeout {
                Some(limit) => pool.get_timeout(limit),
                None => pool.get(),
            };
            let mut conn = checked_out.map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;
            f(&mut conn, &abandonment).map_err(|e| {
                if e.context().operation.is_none() {
                    e.with_operation(operation)
                } else {
                    e
                }
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn missing_article(operation: &str, id: i64) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("article {} not found", id),
        ErrorContext::new(operation)
            .with_entity("article")
            .with_entity_id(id),
    )
}

fn load_article(conn: &mut MysqlConnection, id: i64) -> RepositoryResult<Option<ArticleRow>> {
    Ok(article::table
        .find(id)
        .select(ArticleRow::as_select())
        .first::<ArticleRow>(conn)
        .optional()?)
}

#[async_trait]
impl AuthorRepository for MySqlRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Author> {
        self.with_conn("get_author", move |conn, _| {
            author::table
                .find(id)
                .select(AuthorRow::as_select())
                .first::<AuthorRow>(conn)
                .optional()?
                .map(Author::from)
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("author {} not found", id),
                        ErrorContext::new("get_author")
                            .with_entity("author")
                            .with_entity_id(id),
                    )
                })
        })
        .await
    }
}

#[async_trait]
impl ArticleRepository for MySqlRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn, _| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    async fn list(&self, cursor: i64, page_size: i64) -> RepositoryResult<ArticlePage> {
        self.with_conn("list_articles", move |conn, _| {
            let rows = article::table
                .filter(article::id.gt(cursor))
                .order(article::id.asc())
                .limit(page_size)
                .select(ArticleRow::as_select())
                .load::<ArticleRow>(conn)?;

            Ok(ArticlePage::from_items(
                rows.into_iter().map(Article::from).collect(),
            ))
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Article> {
        self.with_conn("get_article", move |conn, _| {
            load_article(conn, id)?
                .map(Article::from)
                .ok_or_else(|| missing_article("get_article", id))
        })
        .await
    }

    async fn get_by_title(&self, title: &str) -> RepositoryResult<Article> {
        let title = title.to_string();
        self.with_conn("get_article_by_title", move |conn, _| {
            article::table
                .filter(article::title.eq(title.as_str()))
                .order(article::id.asc())
                .select(ArticleRow::as_select())
                .first::<ArticleRow>(conn)
                .optional()?
                .map(Article::from)
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("article titled '{}' not found", title),
                        ErrorContext::new("get_article_by_title").with_entity("article"),
                    )
                })
        })
        .await
    }

    async fn create(&self, new_article: &NewArticle) -> RepositoryResult<Article> {
        let new_article = new_article.clone();
        self.with_conn("create_article", move |conn, abandonment| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let now = to_store_naive(now_truncated());
                diesel::insert_into(article::table)
                    .values(&NewArticleRow {
                        title: &new_article.title,
                        content: &new_article.content,
                        author_id: new_article.author_id,
                        updated_at: now,
                        created_at: now,
                    })
                    .execute(tx)?;

                let LastInsertId { id } =
                    sql_query("SELECT LAST_INSERT_ID() AS id").get_result::<LastInsertId>(tx)?;
                let id = i64::try_from(id).map_err(|_| {
                    RepositoryError::internal(format!("inserted id {} exceeds i64", id))
                })?;

                let stored = load_article(tx, id)?.ok_or_else(|| {
                    RepositoryError::internal(format!("inserted article {} not readable", id))
                })?;

                abandonment.ensure_active("create_article")?;
                Ok(stored.into())
            })
        })
        .await
    }

    async fn update(&self, changes: &Article) -> RepositoryResult<Article> {
        let changes = changes.clone();
        self.with_conn("update_article", move |conn, abandonment| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                if load_article(tx, changes.id)?.is_none() {
                    return Err(missing_article("update_article", changes.id));
                }

                diesel::update(article::table.find(changes.id))
                    .set(&ArticleChangeset {
                        title: &changes.title,
                        content: &changes.content,
                        author_id: changes.author_id(),
                        updated_at: to_store_naive(now_truncated()),
                    })
                    .execute(tx)?;

                let stored = load_article(tx, changes.id)?
                    .ok_or_else(|| missing_article("update_article", changes.id))?;

                abandonment.ensure_active("update_article")?;
                Ok(stored.into())
            })
        })
        .await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn("delete_article", move |conn, abandonment| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let deleted = diesel::delete(article::table.find(id)).execute(tx)?;
                if deleted == 0 {
                    return Err(missing_article("delete_article", id));
                }

                abandonment.ensure_active("delete_article")?;
                Ok(())
            })
        })
        .await
    }
}
