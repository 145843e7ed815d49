//! Database models for enrollments.

use crate::api::models::enrollments::EnrollmentStatus;
use crate::types::{CourseId, EnrollmentId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating an enrollment
#[derive(Debug, Clone)]
pub struct EnrollmentCreateDBRequest {
    pub student_id: UserId,
    pub course_id: CourseId,
}

/// Database response for an enrollment
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentDBResponse {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}
