//! # Articles Service
//!
//! A small article-management REST service: articles with titles, content and
//! an author, paged by cursor, stored in MySQL (or in memory for development).
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`config`]: JSON configuration file (server, context timeout, database)
//! - [`models`]: Domain types (`Article`, `Author`) and store time-zone helpers
//! - [`db`]: Repository traits and their MySQL / in-memory backends
//! - [`services`]: The article usecase (deadlines, author enrichment)
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
