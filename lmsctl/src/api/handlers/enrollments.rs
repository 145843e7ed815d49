//! Handlers for enrollment routes.
//!
//! Students enroll themselves; admins can enroll any student. The course
//! roster is visible to the owning instructor and admins. Status transitions
//! layer one extra rule on top of the ownership policy: the enrolled student
//! may drop their own enrollment but not mark it completed.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        enrollments::{EnrollmentCreate, EnrollmentResponse, EnrollmentStatus, EnrollmentStatusUpdate},
        users::{CurrentUser, Role},
    },
    auth::policy,
    db::{
        handlers::{Courses, Enrollments, Repository, Users},
        models::enrollments::EnrollmentCreateDBRequest,
    },
    errors::Error,
    types::{CourseId, EnrollmentId, Operation, ResourceKind, UserId},
};

/// Enroll a student in a course.
///
/// Students enroll themselves (`studentId` may be omitted); admins must name
/// the student. A second enrollment in the same course is a conflict.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/enrollments",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = EnrollmentCreate,
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course or student not found"),
        (status = 409, description = "Already enrolled"),
    ),
    security(("bearer_token" = []))
)]
pub async fn enroll_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<CourseId>,
    Json(request): Json<EnrollmentCreate>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), Error> {
    let student_id = match user.role {
        Role::Student => {
            // A student may only enroll themself
            match request.student_id {
                Some(id) if id != user.id => {
                    return Err(Error::AccessDenied {
                        action: Operation::Create,
                        resource: format!("enrollment for student {id}"),
                    });
                }
                _ => user.id,
            }
        }
        Role::Admin => request.student_id.ok_or_else(|| Error::BadRequest {
            message: "studentId is required when an admin enrolls a student".to_string(),
        })?,
        Role::Instructor => {
            return Err(Error::AccessDenied {
                action: Operation::Create,
                resource: "enrollments".to_string(),
            });
        }
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Courses::new(&mut pool_conn)
        .get_by_id(course_id)
        .await?
        .ok_or_else(|| Error::not_found("Course", course_id))?;

    // The target must be a student account
    Users::new(&mut pool_conn)
        .find_by_id_and_role(student_id, Role::Student)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    // Duplicate enrollments are caught by the unique constraint and
    // surface as a 409
    let enrollment = Enrollments::new(&mut pool_conn)
        .create(&EnrollmentCreateDBRequest { student_id, course_id })
        .await?;

    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from(enrollment))))
}

/// List a course's enrollments (admin or the owning instructor)
#[utoipa::path(
    get,
    path = "/api/courses/{id}/enrollments",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrollments for the course", body = [EnrollmentResponse]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_course_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Vec<EnrollmentResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let course = Courses::new(&mut pool_conn)
        .get_by_id(course_id)
        .await?
        .ok_or_else(|| Error::not_found("Course", course_id))?;
    policy::ensure_can_access(&user, course.instructor_id, ResourceKind::Course, Operation::Read)?;

    let enrollments = Enrollments::new(&mut pool_conn).list_for_course(course_id).await?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from).collect()))
}

/// List a student's enrollments (self, instructor, or admin)
#[utoipa::path(
    get,
    path = "/api/students/{id}/enrollments",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Enrollments for the student", body = [EnrollmentResponse]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_student_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<UserId>,
) -> Result<Json<Vec<EnrollmentResponse>>, Error> {
    policy::ensure_can_access(&user, student_id, ResourceKind::Student, Operation::Read)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Users::new(&mut pool_conn)
        .find_by_id_and_role(student_id, Role::Student)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    let enrollments = Enrollments::new(&mut pool_conn).list_for_student(student_id).await?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from).collect()))
}

/// Update an enrollment's status.
///
/// Admins and the course's instructor may set any status; the enrolled
/// student may only drop.
#[utoipa::path(
    patch,
    path = "/api/enrollments/{id}",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = EnrollmentStatusUpdate,
    responses(
        (status = 200, description = "Enrollment updated", body = EnrollmentResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Enrollment not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_enrollment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<EnrollmentId>,
    Json(request): Json<EnrollmentStatusUpdate>,
) -> Result<Json<EnrollmentResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut pool_conn);

    let enrollment = repo.get_by_id(id).await?.ok_or_else(|| Error::not_found("Enrollment", id))?;

    let course = Courses::new(&mut pool_conn)
        .get_by_id(enrollment.course_id)
        .await?
        .ok_or_else(|| Error::not_found("Course", enrollment.course_id))?;

    // Course ownership covers admins and the owning instructor; the enrolled
    // student gets exactly one extra move: dropping out
    let course_manager = policy::can_access(&user, course.instructor_id, ResourceKind::Course);
    let own_drop = user.role == Role::Student && enrollment.student_id == user.id && request.status == EnrollmentStatus::Dropped;
    if !course_manager && !own_drop {
        return Err(Error::AccessDenied {
            action: Operation::Update,
            resource: format!("enrollment {id}"),
        });
    }

    let updated = Enrollments::new(&mut pool_conn).update_status(id, request.status).await?;

    Ok(Json(EnrollmentResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::courses::CourseResponse;
    use crate::test_utils::{bearer_for, create_test_state, create_test_user};
    use axum_test::TestServer;
    use sqlx::PgPool;

    async fn server(state: &AppState) -> TestServer {
        TestServer::new(crate::build_router(state).unwrap()).unwrap()
    }

    async fn create_course(server: &TestServer, state: &AppState, owner: &crate::db::models::users::UserDBResponse) -> CourseResponse {
        server
            .post("/api/courses")
            .add_header("authorization", bearer_for(state, owner))
            .json(&serde_json::json!({"title": "Enrollable"}))
            .await
            .json()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_student_enrolls_self(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let instructor = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;
        let course = create_course(&server, &state, &instructor).await;

        let response = server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let enrollment: EnrollmentResponse = response.json();
        assert_eq!(enrollment.student_id, student.id);
        assert_eq!(enrollment.status, EnrollmentStatus::Active);

        // Enrolling twice is a conflict
        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({}))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_student_cannot_enroll_someone_else(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let instructor = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;
        let victim = create_test_user(&state, Role::Student).await;
        let course = create_course(&server, &state, &instructor).await;

        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({"studentId": victim.id}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // Instructors cannot enroll anyone either
        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &instructor))
            .json(&serde_json::json!({"studentId": student.id}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_enrolls_named_student(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let instructor = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;
        let admin = create_test_user(&state, Role::Admin).await;
        let course = create_course(&server, &state, &instructor).await;

        // studentId is mandatory for admins
        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &admin))
            .json(&serde_json::json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        // And must point at a student account
        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &admin))
            .json(&serde_json::json!({"studentId": instructor.id}))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &admin))
            .json(&serde_json::json!({"studentId": student.id}))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_roster_visibility(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let owner = create_test_user(&state, Role::Instructor).await;
        let peer = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;
        let course = create_course(&server, &state, &owner).await;

        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({}))
            .await
            .assert_status(StatusCode::CREATED);

        // Owner sees the roster
        let response = server
            .get(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &owner))
            .await;
        response.assert_status_ok();
        let roster: Vec<EnrollmentResponse> = response.json();
        assert_eq!(roster.len(), 1);

        // Other instructors and students do not
        server
            .get(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &peer))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_student_enrollment_listing_access(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let instructor = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;
        let other = create_test_user(&state, Role::Student).await;
        let course = create_course(&server, &state, &instructor).await;

        server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({}))
            .await
            .assert_status(StatusCode::CREATED);

        // Self and instructors can read a student's enrollments
        server
            .get(&format!("/api/students/{}/enrollments", student.id))
            .add_header("authorization", bearer_for(&state, &student))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/students/{}/enrollments", student.id))
            .add_header("authorization", bearer_for(&state, &instructor))
            .await
            .assert_status_ok();

        // Another student cannot
        server
            .get(&format!("/api/students/{}/enrollments", student.id))
            .add_header("authorization", bearer_for(&state, &other))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_status_transition_rules(pool: PgPool) {
        let state = create_test_state(pool).await;
        let server = server(&state).await;

        let owner = create_test_user(&state, Role::Instructor).await;
        let peer = create_test_user(&state, Role::Instructor).await;
        let student = create_test_user(&state, Role::Student).await;
        let course = create_course(&server, &state, &owner).await;

        let enrollment: EnrollmentResponse = server
            .post(&format!("/api/courses/{}/enrollments", course.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({}))
            .await
            .json();

        // The student cannot mark their enrollment completed
        server
            .patch(&format!("/api/enrollments/{}", enrollment.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({"status": "COMPLETED"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // The course's instructor can
        let response = server
            .patch(&format!("/api/enrollments/{}", enrollment.id))
            .add_header("authorization", bearer_for(&state, &owner))
            .json(&serde_json::json!({"status": "COMPLETED"}))
            .await;
        response.assert_status_ok();
        let updated: EnrollmentResponse = response.json();
        assert_eq!(updated.status, EnrollmentStatus::Completed);

        // An unrelated instructor cannot touch it
        server
            .patch(&format!("/api/enrollments/{}", enrollment.id))
            .add_header("authorization", bearer_for(&state, &peer))
            .json(&serde_json::json!({"status": "DROPPED"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // But the student may drop their own enrollment
        let response = server
            .patch(&format!("/api/enrollments/{}", enrollment.id))
            .add_header("authorization", bearer_for(&state, &student))
            .json(&serde_json::json!({"status": "DROPPED"}))
            .await;
        response.assert_status_ok();
        let updated: EnrollmentResponse = response.json();
        assert_eq!(updated.status, EnrollmentStatus::Dropped);
    }
}
