//! Repository traits for article and author storage.
//!
//! Each trait has one production implementation (`MySqlRepository`) and an
//! in-memory one (`LocalRepository`) used for development and tests.

pub mod article;
pub mod author;
pub mod deadline;
pub mod error;

pub use article::ArticleRepository;
pub use author::AuthorRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
