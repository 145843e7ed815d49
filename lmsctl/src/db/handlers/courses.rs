//! Database repository for courses.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::courses::{CourseCreateDBRequest, CourseDBResponse, CourseUpdateDBRequest},
    },
    types::{CourseId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing courses
#[derive(Debug, Clone)]
pub struct CourseFilter {
    pub instructor_id: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            instructor_id: None,
            skip: 0,
            limit: 100,
        }
    }
}

pub struct Courses<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Courses<'c> {
    type CreateRequest = CourseCreateDBRequest;
    type UpdateRequest = CourseUpdateDBRequest;
    type Response = CourseDBResponse;
    type Id = CourseId;
    type Filter = CourseFilter;

    #[instrument(skip(self, request), fields(title = %request.title, instructor_id = request.instructor_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let course = sqlx::query_as::<_, CourseDBResponse>(
            r#"
            INSERT INTO courses (title, description, duration_weeks, max_students, instructor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, duration_weeks, max_students, instructor_id, created_at, updated_at
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.duration_weeks)
        .bind(request.max_students)
        .bind(request.instructor_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(course)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let course = sqlx::query_as::<_, CourseDBResponse>(
            "SELECT id, title, description, duration_weeks, max_students, instructor_id, created_at, updated_at
             FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(course)
    }

    #[instrument(skip(self, filter), fields(instructor_id = ?filter.instructor_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let courses = sqlx::query_as::<_, CourseDBResponse>(
            r#"
            SELECT id, title, description, duration_weeks, max_students, instructor_id, created_at, updated_at
            FROM courses
            WHERE ($1::integer IS NULL OR instructor_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.instructor_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(courses)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let course = sqlx::query_as::<_, CourseDBResponse>(
            r#"
            UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                duration_weeks = COALESCE($4, duration_weeks),
                max_students = COALESCE($5, max_students),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, duration_weeks, max_students, instructor_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.duration_weeks)
        .bind(request.max_students)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(course)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Courses<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn create_instructor(pool: &PgPool, username: &str) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&UserCreateDBRequest {
                role: Role::Instructor,
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "fake-hash".to_string(),
                first_name: "Test".to_string(),
                last_name: "Instructor".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn course_request(instructor_id: UserId, title: &str) -> CourseCreateDBRequest {
        CourseCreateDBRequest {
            title: title.to_string(),
            description: Some("A test course".to_string()),
            duration_weeks: Some(8),
            max_students: 50,
            instructor_id,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_list_courses(pool: PgPool) {
        let instructor_id = create_instructor(&pool, "teach1").await;
        let other_id = create_instructor(&pool, "teach2").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let created = repo.create(&course_request(instructor_id, "Rust 101")).await.unwrap();
        repo.create(&course_request(other_id, "Databases")).await.unwrap();

        assert_eq!(created.title, "Rust 101");
        assert_eq!(created.max_students, 50);

        let all = repo.list(&CourseFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let mine = repo
            .list(&CourseFilter {
                instructor_id: Some(instructor_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, created.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_course_fields(pool: PgPool) {
        let instructor_id = create_instructor(&pool, "teach3").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let created = repo.create(&course_request(instructor_id, "Draft title")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &CourseUpdateDBRequest {
                    title: Some("Final title".to_string()),
                    max_students: Some(25),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Final title");
        assert_eq!(updated.max_students, 25);
        assert_eq!(updated.duration_weeks, Some(8));

        let err = repo.update(9999, &CourseUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_course_requires_existing_instructor(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let err = repo.create(&course_request(12345, "Orphan course")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_course(pool: PgPool) {
        let instructor_id = create_instructor(&pool, "teach4").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let created = repo.create(&course_request(instructor_id, "Short lived")).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
