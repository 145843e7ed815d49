//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Repository Pattern
//!
//! Each entity (users, courses, lessons, enrollments) has a repository that
//! encapsulates all database access for that table. Repositories wrap a
//! `PgConnection` so they compose with transactions:
//!
//! ```ignore
//! use lmsctl::db::handlers::{Repository, Users};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut users_repo = Users::new(&mut tx);
//!
//!     if let Some(user) = users_repo.find_by_username_and_role("alice", Role::Student).await? {
//!         println!("Found user: {}", user.username);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Migrations
//!
//! Database migrations live in `migrations/` and run on startup via
//! [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
