//! Database repository for enrollments.

use crate::{
    api::models::enrollments::EnrollmentStatus,
    db::{
        errors::{DbError, Result},
        models::enrollments::{EnrollmentCreateDBRequest, EnrollmentDBResponse},
    },
    types::{CourseId, EnrollmentId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Enrollments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Enrollments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert a new active enrollment.
    ///
    /// The `(student_id, course_id)` unique constraint is the final race-safety
    /// backstop: concurrent duplicate enrollments surface as a
    /// [`DbError::UniqueViolation`], which maps to a 409 upstream.
    #[instrument(skip(self, request), fields(student_id = request.student_id, course_id = request.course_id), err)]
    pub async fn create(&mut self, request: &EnrollmentCreateDBRequest) -> Result<EnrollmentDBResponse> {
        let enrollment = sqlx::query_as::<_, EnrollmentDBResponse>(
            r#"
            INSERT INTO enrollments (student_id, course_id)
            VALUES ($1, $2)
            RETURNING id, student_id, course_id, status, enrolled_at
            "#,
        )
        .bind(request.student_id)
        .bind(request.course_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(enrollment)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: EnrollmentId) -> Result<Option<EnrollmentDBResponse>> {
        let enrollment = sqlx::query_as::<_, EnrollmentDBResponse>(
            "SELECT id, student_id, course_id, status, enrolled_at FROM enrollments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(enrollment)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_course(&mut self, course_id: CourseId) -> Result<Vec<EnrollmentDBResponse>> {
        let enrollments = sqlx::query_as::<_, EnrollmentDBResponse>(
            "SELECT id, student_id, course_id, status, enrolled_at
             FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at ASC",
        )
        .bind(course_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(enrollments)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_student(&mut self, student_id: UserId) -> Result<Vec<EnrollmentDBResponse>> {
        let enrollments = sqlx::query_as::<_, EnrollmentDBResponse>(
            "SELECT id, student_id, course_id, status, enrolled_at
             FROM enrollments WHERE student_id = $1 ORDER BY enrolled_at ASC",
        )
        .bind(student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(enrollments)
    }

    #[instrument(skip(self), fields(status = ?status), err)]
    pub async fn update_status(&mut self, id: EnrollmentId, status: EnrollmentStatus) -> Result<EnrollmentDBResponse> {
        let enrollment = sqlx::query_as::<_, EnrollmentDBResponse>(
            "UPDATE enrollments SET status = $2 WHERE id = $1
             RETURNING id, student_id, course_id, status, enrolled_at",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(enrollment)
    }
}
