//! API request/response models for enrollments.

use crate::db::models::enrollments::EnrollmentDBResponse;
use crate::types::{CourseId, EnrollmentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Enrollment lifecycle state. Uppercase in JSON ("ACTIVE"), lowercase in the
/// `enrollment_status` postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

/// Body of `POST /api/courses/{id}/enrollments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCreate {
    /// Student to enroll. Students may omit this (or name themselves);
    /// admins must name a student.
    pub student_id: Option<UserId>,
}

/// Body of `PATCH /api/enrollments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentStatusUpdate {
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl From<EnrollmentDBResponse> for EnrollmentResponse {
    fn from(db: EnrollmentDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            course_id: db.course_id,
            status: db.status,
            enrolled_at: db.enrolled_at,
        }
    }
}
