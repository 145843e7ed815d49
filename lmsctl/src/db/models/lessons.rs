//! Database models for lessons.

use crate::types::{CourseId, LessonId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a lesson
#[derive(Debug, Clone)]
pub struct LessonCreateDBRequest {
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub lesson_order: i32,
}

/// Database response for a lesson
#[derive(Debug, Clone, FromRow)]
pub struct LessonDBResponse {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub lesson_order: i32,
    pub created_at: DateTime<Utc>,
}
