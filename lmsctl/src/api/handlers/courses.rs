//! Handlers for course and lesson routes.
//!
//! Courses are owned by instructors. Reads are open to any authenticated
//! user; writes require the owning instructor or an admin, and deletion is
//! admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        courses::{CourseCreate, CourseResponse, CourseUpdate, LessonCreate, LessonResponse, ListCoursesQuery},
        users::{CurrentUser, Role},
    },
    auth::policy,
    db::{
        handlers::{Courses, Lessons, Repository, Users, courses::CourseFilter},
        models::{
            courses::{CourseCreateDBRequest, CourseUpdateDBRequest},
            lessons::LessonCreateDBRequest,
        },
    },
    errors::Error,
    types::{CourseId, LessonId, Operation, ResourceKind},
};

/// List courses, optionally filtered by instructor
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "List of courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Vec<CourseResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut pool_conn);

    let courses = repo
        .list(&CourseFilter {
            instructor_id: query.instructor_id,
            skip: query.skip.unwrap_or(0),
            limit: query.limit.unwrap_or(100).min(1000),
        })
        .await?;

    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Get a course by id
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_course(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<CourseId>,
) -> Result<Json<CourseResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut pool_conn);

    let course = repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Course", id))?;

    Ok(Json(CourseResponse::from(course)))
}

/// Create a course.
///
/// Instructors create courses for themselves; admins may create a course for
/// any instructor by naming them in `instructorId`.
#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "courses",
    request_body = CourseCreate,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Missing or invalid instructor"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), Error> {
    let instructor_id = match user.role {
        Role::Instructor => {
            // Instructors can only create courses for themselves
            match request.instructor_id {
                Some(id) if id != user.id => {
                    return Err(Error::AccessDenied {
                        action: Operation::Create,
                        resource: format!("course owned by instructor {id}"),
                    });
                }
                _ => user.id,
            }
        }
        Role::Admin => request.instructor_id.ok_or_else(|| Error::BadRequest {
            message: "instructorId is required when an admin creates a course".to_string(),
        })?,
        Role::Student => {
            return Err(Error::AccessDenied {
                action: Operation::Create,
                resource: "courses".to_string(),
            });
        }
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // The owner must be an actual instructor account
    let mut users = Users::new(&mut pool_conn);
    users
        .find_by_id_and_role(instructor_id, Role::Instructor)
        .await?
        .ok_or_else(|| Error::not_found("Instructor", instructor_id))?;

    let mut repo = Courses::new(&mut pool_conn);
    let course = repo
        .create(&CourseCreateDBRequest {
            title: request.title,
            description: request.description,
            duration_weeks: request.duration_weeks,
            max_students: request.max_students.unwrap_or(50),
            instructor_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// Update a course (admin or the owning instructor)
#[utoipa::path(
    patch,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CourseUpdate,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CourseId>,
    Json(request): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut pool_conn);

    let course = repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Course", id))?;
    policy::ensure_can_access(&user, course.instructor_id, ResourceKind::Course, Operation::Update)?;

    let updated = repo
        .update(
            id,
            &CourseUpdateDBRequest {
                title: request.title,
                description: request.description,
                duration_weeks: request.duration_weeks,
                max_students: request.max_students,
            },
        )
        .await?;

    Ok(Json(CourseResponse::from(updated)))
}

/// Delete a course (admin only)
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_course(State(state): State<AppState>, user: CurrentUser, Path(id): Path<CourseId>) -> Result<StatusCode, Error> {
    policy::ensure_admin(&user, Operation::Delete, format!("course {id}"))?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut pool_conn);

    if !repo.delete(id).await? {
        return Err(Error::not_found("Course", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List a course's lessons
#[utoipa::path(
    get,
    path = "/api/courses/{id}/lessons",
    tag = "courses",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Lessons in order", body = [LessonResponse]),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_lessons(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<CourseId>,
) -> Result<Json<Vec<LessonResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Courses::new(&mut pool_conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Course", id))?;

    let lessons = Lessons::new(&mut pool_conn).list_for_course(id).await?;

    Ok(Json(lessons.into_iter().map(LessonResponse::from).collect()))
}

/// Add a lesson to a course (admin or the owning instructor)
#[utoipa::path(
    post,
    path = "/api/courses/{id}/lessons",
    tag = "courses",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = LessonCreate,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CourseId>,
    Json(request): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonResponse>), Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let course = Courses::new(&mut pool_conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Course", id))?;
    policy::ensure_can_access(&user, course.instructor_id, ResourceKind::Course, Operation::Update)?;

    let lesson = Lessons::new(&mut pool_conn)
        .create(&LessonCreateDBRequest {
            course_id: id,
            title: request.title,
            description: request.description,
            lesson_order: request.lesson_order,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(LessonResponse::from(lesson))))
}

/// Remove a lesson from a course (admin or the owning instructor)
#[utoipa::path(
    delete,
    path = "/api/courses/{id}/lessons/{lesson_id}",
    tag = "courses",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("lesson_id" = i32, Path, description = "Lesson ID"),
    ),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course or lesson not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, lesson_id)): Path<(CourseId, LessonId)>,
) -> Result<StatusCode, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let course = Courses::new(&mut pool_conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Course", id))?;
    policy::ensure_can_access(&user, course.instructor_id, ResourceKind::Course, Operation::Delete)?;

    if !Lessons::new(&mut pool_conn).delete(id, lesson_id).await? {
        return Err(Error::not_found("Lesson", lesson_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{bearer_for, create_test_state, create_test_user};
    use axum_test::TestServer;
    use sqlx::PgPool;

    async fn server(state: &AppState) -> TestServer {
        TestServer::new(crate::build_router(state).unwrap()).unwrap()
    }

    fn course_body(title: &str) -> serde_json::Value {
        serde_json::json!({
            "title": title,
            "description": "A course",
            "durationWeeks": 8
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_instructor_creates_own_course(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let instructor = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;

        let response = server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &instructor))
            .json(&course_body("Rust 101"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let course: CourseResponse = response.json();
        assert_eq!(course.instructor_id, instructor.id);
        assert_eq!(course.max_students, 50);

        // Students cannot create courses
        server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &student))
            .json(&course_body("Nope"))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // Any authenticated user can browse the catalog
        let response = server
            .get("/api/courses")
            .add_header("authorization", bearer_for(&state, &student))
            .await;
        response.assert_status_ok();
        let courses: Vec<CourseResponse> = response.json();
        assert_eq!(courses.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_instructor_cannot_create_for_peer(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let instructor = create_test_user(&state, Role::Instructor).await;
        let peer = create_test_user(&state, Role::Instructor).await;

        let mut body = course_body("Hijacked");
        body["instructorId"] = serde_json::json!(peer.id);

        server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &instructor))
            .json(&body)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_creates_for_named_instructor(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let admin = create_test_user(&state, Role::Admin).await;
        let instructor = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;

        // instructorId is mandatory for admins
        server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &admin))
            .json(&course_body("No owner"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        // And must point at an instructor account
        let mut body = course_body("Wrong owner");
        body["instructorId"] = serde_json::json!(student.id);
        server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &admin))
            .json(&body)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let mut body = course_body("Assigned course");
        body["instructorId"] = serde_json::json!(instructor.id);
        let response = server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &admin))
            .json(&body)
            .await;
        response.assert_status(StatusCode::CREATED);
        let course: CourseResponse = response.json();
        assert_eq!(course.instructor_id, instructor.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_course_update_and_delete_gates(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let owner = create_test_user(&state, Role::Instructor).await;
        let peer = create_test_user(&state, Role::Instructor).await;
        let admin = create_test_user(&state, Role::Admin).await;

        let response = server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &owner))
            .json(&course_body("Guarded"))
            .await;
        let course: CourseResponse = response.json();

        // Owner can update
        server
            .patch(&format!("/api/courses/{}", course.id))
            .add_header("authorization", bearer_for(&state, &owner))
            .json(&serde_json::json!({"title": "Guarded v2"}))
            .await
            .assert_status_ok();

        // A different instructor cannot
        server
            .patch(&format!("/api/courses/{}", course.id))
            .add_header("authorization", bearer_for(&state, &peer))
            .json(&serde_json::json!({"title": "Stolen"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // Deletion is admin-only, even for the owner
        server
            .delete(&format!("/api/courses/{}", course.id))
            .add_header("authorization", bearer_for(&state, &owner))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete(&format!("/api/courses/{}", course.id))
            .add_header("authorization", bearer_for(&state, &admin))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_lesson_routes(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let owner = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;

        let response = server
            .post("/api/courses")
            .add_header("authorization", bearer_for(&state, &owner))
            .json(&course_body("With lessons"))
            .await;
        let course: CourseResponse = response.json();

        // Owner adds lessons
        let response = server
            .post(&format!("/api/courses/{}/lessons", course.id))
            .add_header("authorization", bearer_for(&state, &owner))
            .json(&serde_json::json!({"title": "Intro", "lessonOrder": 1}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let lesson: LessonResponse = response.json();

        // Students cannot
        server
            .post(&format!("/api/courses/{}/lessons", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({"title": "Sneaky", "lessonOrder": 2}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // But students can read them
        let response = server
            .get(&format!("/api/courses/{}/lessons", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .await;
        response.assert_status_ok();
        let lessons: Vec<LessonResponse> = response.json();
        assert_eq!(lessons.len(), 1);

        // Owner removes the lesson
        server
            .delete(&format!("/api/courses/{}/lessons/{}", course.id, lesson.id))
            .add_header("authorization", bearer_for(&state, &owner))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
}
