//! API request/response models for courses and lessons.

use crate::db::models::courses::CourseDBResponse;
use crate::db::models::lessons::LessonDBResponse;
use crate::types::{CourseId, LessonId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreate {
    pub title: String,
    pub description: Option<String>,
    pub duration_weeks: Option<i32>,
    pub max_students: Option<i32>,
    /// Instructor who owns the course. Instructors may only name themselves;
    /// admins must name a target instructor.
    pub instructor_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_weeks: Option<i32>,
    pub max_students: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub duration_weeks: Option<i32>,
    pub max_students: i32,
    pub instructor_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CourseDBResponse> for CourseResponse {
    fn from(db: CourseDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            duration_weeks: db.duration_weeks,
            max_students: db.max_students,
            instructor_id: db.instructor_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing courses
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListCoursesQuery {
    /// Restrict to courses owned by one instructor
    pub instructor_id: Option<UserId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonCreate {
    pub title: String,
    pub description: Option<String>,
    pub lesson_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub lesson_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<LessonDBResponse> for LessonResponse {
    fn from(db: LessonDBResponse) -> Self {
        Self {
            id: db.id,
            course_id: db.course_id,
            title: db.title,
            description: db.description,
            lesson_order: db.lesson_order,
            created_at: db.created_at,
        }
    }
}
