//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repositories. They bound
//! every call with the configured deadline and assemble complete domain
//! objects from several repository lookups.

pub mod article_service;

pub use article_service::{ArticleService, ArticleUsecase};
