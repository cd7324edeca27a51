//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! article usecase for business logic.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};

use super::dto::{ArticleListResponse, ArticleRequest, HealthResponse, ListArticlesQuery};
use super::error::AppError;
use super::middleware::X_CURSOR;
use super::state::AppState;
use crate::models::Article;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Path ids must be positive integers.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::BadRequest(format!(
            "article id must be a positive integer, got '{}'",
            raw
        ))),
    }
}

fn json_body(body: Result<Json<ArticleRequest>, JsonRejection>) -> Result<ArticleRequest, AppError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Always answers 200; the `database` field reports the store ping.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.articles.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            "error".to_string()
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database,
    })
}

// =============================================================================
// Articles
// =============================================================================

/// GET /articles?cursor=&num=
///
/// One page of articles. The next cursor is returned in the body and in the
/// `X-Cursor` header.
pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<ListArticlesQuery>, QueryRejection>,
) -> Result<(HeaderMap, Json<ArticleListResponse>), AppError> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let cursor = query.cursor()?;
    let num = query.page_size()?;

    let page = state.articles.fetch(cursor, num).await?;
    let next_cursor = page
        .next_cursor
        .map(|c| c.to_string())
        .unwrap_or_default();

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&next_cursor) {
        headers.insert(X_CURSOR, value);
    }

    Ok((
        headers,
        Json(ArticleListResponse {
            items: page.items,
            cursor: next_cursor,
        }),
    ))
}

/// GET /articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Article> {
    let id = parse_id(&id)?;
    let article = state.articles.get_by_id(id).await?;
    Ok(Json(article))
}

/// POST /articles
///
/// Create an article and return it with its author, status 201.
pub async fn create_article(
    State(state): State<AppState>,
    body: Result<Json<ArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let new_article = json_body(body)?.into_new_article()?;
    let article = state.articles.store(new_article).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /articles/{id}
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ArticleRequest>, JsonRejection>,
) -> HandlerResult<Article> {
    let id = parse_id(&id)?;
    let changes = json_body(body)?.into_new_article()?;
    let article = state.articles.update(id, changes).await?;
    Ok(Json(article))
}

/// DELETE /articles/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.articles.delete(id).await?;
    Ok(StatusCode::OK)
}
