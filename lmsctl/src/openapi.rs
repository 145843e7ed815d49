//! OpenAPI document assembly.
//!
//! Collects every annotated handler and schema into one document, served by
//! RapiDoc at `/docs` (see [`crate::build_router`]).

use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use crate::api::handlers;
use crate::api::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::get_registration_info,
        handlers::auth::login,
        handlers::auth::register,
        handlers::users::list_students,
        handlers::users::create_student,
        handlers::users::get_student,
        handlers::users::update_student,
        handlers::users::delete_student,
        handlers::users::list_instructors,
        handlers::users::create_instructor,
        handlers::users::get_instructor,
        handlers::users::update_instructor,
        handlers::users::delete_instructor,
        handlers::users::list_admins,
        handlers::users::create_admin,
        handlers::users::get_admin,
        handlers::users::update_admin,
        handlers::users::delete_admin,
        handlers::courses::list_courses,
        handlers::courses::get_course,
        handlers::courses::create_course,
        handlers::courses::update_course,
        handlers::courses::delete_course,
        handlers::courses::list_lessons,
        handlers::courses::create_lesson,
        handlers::courses::delete_lesson,
        handlers::enrollments::enroll_student,
        handlers::enrollments::list_course_enrollments,
        handlers::enrollments::list_student_enrollments,
        handlers::enrollments::update_enrollment,
    ),
    components(schemas(
        models::auth::AuthResponse,
        models::auth::LoginRequest,
        models::auth::RegisterRequest,
        models::auth::RegistrationInfo,
        models::users::Role,
        models::users::UserCreate,
        models::users::UserUpdate,
        models::users::UserResponse,
        models::courses::CourseCreate,
        models::courses::CourseUpdate,
        models::courses::CourseResponse,
        models::courses::LessonCreate,
        models::courses::LessonResponse,
        models::enrollments::EnrollmentCreate,
        models::enrollments::EnrollmentResponse,
        models::enrollments::EnrollmentStatus,
        models::enrollments::EnrollmentStatusUpdate,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Login and registration"),
        (name = "students", description = "Student account management"),
        (name = "instructors", description = "Instructor account management"),
        (name = "admins", description = "Admin account management"),
        (name = "courses", description = "Course catalog and lessons"),
        (name = "enrollments", description = "Course enrollment"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
