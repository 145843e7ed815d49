//! Database models for courses.

use crate::types::{CourseId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a course
#[derive(Debug, Clone)]
pub struct CourseCreateDBRequest {
    pub title: String,
    pub description: Option<String>,
    pub duration_weeks: Option<i32>,
    pub max_students: i32,
    pub instructor_id: UserId,
}

/// Database request for updating a course
#[derive(Debug, Clone, Default)]
pub struct CourseUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_weeks: Option<i32>,
    pub max_students: Option<i32>,
}

/// Database response for a course
#[derive(Debug, Clone, FromRow)]
pub struct CourseDBResponse {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub duration_weeks: Option<i32>,
    pub max_students: i32,
    pub instructor_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
