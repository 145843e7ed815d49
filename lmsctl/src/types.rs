//! Common type definitions shared across the API, auth, and database layers.
//!
//! Entity identifiers are plain `i32`s (the tables use `SERIAL` keys) wrapped
//! in type aliases for readability. [`ResourceKind`] and [`Operation`] feed
//! the access-control checks in [`crate::auth::policy`] and the permission
//! error messages in [`crate::errors`].

use crate::api::models::users::Role;
use std::fmt;

// Type aliases for IDs
pub type UserId = i32;
pub type CourseId = i32;
pub type LessonId = i32;
pub type EnrollmentId = i32;

/// The kind of entity an access check targets.
///
/// For user records this is the role partition the record lives in; a course
/// is owned by its instructor, so for ownership purposes it belongs to the
/// instructor category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Student,
    Instructor,
    Admin,
    Course,
}

impl ResourceKind {
    /// The role that counts as the "owner" category for this resource.
    pub fn owning_role(&self) -> Role {
        match self {
            ResourceKind::Student => Role::Student,
            ResourceKind::Instructor => Role::Instructor,
            ResourceKind::Admin => Role::Admin,
            ResourceKind::Course => Role::Instructor,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Student => write!(f, "student"),
            ResourceKind::Instructor => write!(f, "instructor"),
            ResourceKind::Admin => write!(f, "admin"),
            ResourceKind::Course => write!(f, "course"),
        }
    }
}

// Operations that can be performed on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    List,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::List => write!(f, "list"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}
