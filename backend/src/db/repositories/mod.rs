//! Repository implementations module.
//!
//! This module contains the implementations of the repository traits:
//! - `mysql`: MySQL implementation with Diesel ORM
//! - `local`: In-memory implementation for unit testing and local development
pub mod local;
#[cfg(feature = "mysql-repo")]
pub mod mysql;

pub use local::LocalRepository;
#[cfg(feature = "mysql-repo")]
pub use mysql::{MySqlConfig, MySqlRepository};
