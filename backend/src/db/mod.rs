//! Database module for article and author storage.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Service Layer (services/) - timeouts, author enrichment │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! │  - ArticleRepository                                     │
//! │  - AuthorRepository                                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     │                               │
//! ┌───▼──────────────┐   ┌────────────▼─────┐
//! │ MySqlRepository  │   │ LocalRepository  │
//! │ (Diesel + r2d2)  │   │ (in-memory)      │
//! └──────────────────┘   └──────────────────┘
//! ```
//!
//! Use [`RepositoryFactory::create`] with the `database` section of the
//! configuration file to obtain the repositories for the selected backend.

#[cfg(not(any(feature = "mysql-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

pub use factory::{Repositories, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "mysql-repo")]
pub use repositories::{MySqlConfig, MySqlRepository};
pub use repository::{
    ArticleRepository, AuthorRepository, ErrorContext, RepositoryError, RepositoryResult,
};
