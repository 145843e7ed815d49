//! Database record structures matching table schemas.

pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod users;
