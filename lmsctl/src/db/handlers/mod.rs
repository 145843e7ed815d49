//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: Account storage for all three roles
//! - [`Courses`]: Course catalog
//! - [`Lessons`]: Lesson content per course
//! - [`Enrollments`]: Student/course enrollment records

pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod repository;
pub mod users;

pub use courses::Courses;
pub use enrollments::Enrollments;
pub use lessons::Lessons;
pub use repository::Repository;
pub use users::Users;
