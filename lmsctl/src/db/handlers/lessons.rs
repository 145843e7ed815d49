//! Database repository for lessons.

use crate::{
    db::{
        errors::Result,
        models::lessons::{LessonCreateDBRequest, LessonDBResponse},
    },
    types::{CourseId, LessonId},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Lessons<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Lessons<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(course_id = request.course_id, title = %request.title), err)]
    pub async fn create(&mut self, request: &LessonCreateDBRequest) -> Result<LessonDBResponse> {
        let lesson = sqlx::query_as::<_, LessonDBResponse>(
            r#"
            INSERT INTO lessons (course_id, title, description, lesson_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, course_id, title, description, lesson_order, created_at
            "#,
        )
        .bind(request.course_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.lesson_order)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(lesson)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_course(&mut self, course_id: CourseId) -> Result<Vec<LessonDBResponse>> {
        let lessons = sqlx::query_as::<_, LessonDBResponse>(
            "SELECT id, course_id, title, description, lesson_order, created_at
             FROM lessons WHERE course_id = $1 ORDER BY lesson_order ASC",
        )
        .bind(course_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(lessons)
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, course_id: CourseId, lesson_id: LessonId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1 AND course_id = $2")
            .bind(lesson_id)
            .bind(course_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::{Courses, Repository, Users};
    use crate::db::models::courses::CourseCreateDBRequest;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn create_course(pool: &PgPool) -> CourseId {
        let mut conn = pool.acquire().await.unwrap();
        let instructor = Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                role: Role::Instructor,
                username: "lesson_teacher".to_string(),
                email: "lesson_teacher@example.com".to_string(),
                password_hash: "fake-hash".to_string(),
                first_name: "Test".to_string(),
                last_name: "Instructor".to_string(),
            })
            .await
            .unwrap();

        Courses::new(&mut conn)
            .create(&CourseCreateDBRequest {
                title: "With lessons".to_string(),
                description: None,
                duration_weeks: None,
                max_students: 50,
                instructor_id: instructor.id,
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_lessons_ordered_by_lesson_order(pool: PgPool) {
        let course_id = create_course(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Lessons::new(&mut conn);

        for (order, title) in [(2, "Second"), (1, "First")] {
            repo.create(&LessonCreateDBRequest {
                course_id,
                title: title.to_string(),
                description: None,
                lesson_order: order,
            })
            .await
            .unwrap();
        }

        let lessons = repo.list_for_course(course_id).await.unwrap();
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0].title, "First");
        assert_eq!(lessons[1].title, "Second");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_is_scoped_to_course(pool: PgPool) {
        let course_id = create_course(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Lessons::new(&mut conn);

        let lesson = repo
            .create(&LessonCreateDBRequest {
                course_id,
                title: "Only lesson".to_string(),
                description: None,
                lesson_order: 1,
            })
            .await
            .unwrap();

        // Wrong course id deletes nothing
        assert!(!repo.delete(course_id + 1, lesson.id).await.unwrap());
        assert!(repo.delete(course_id, lesson.id).await.unwrap());
    }
}
