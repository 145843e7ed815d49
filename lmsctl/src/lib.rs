//! # lmsctl: Learning-Management Backend
//!
//! `lmsctl` is a role-based learning-management backend. It exposes a REST API
//! for students, instructors, admins, courses, lessons, and enrollments,
//! backed by PostgreSQL and protected by stateless bearer-token
//! authentication.
//!
//! ## Overview
//!
//! Three kinds of account use the system. **Students** browse the course
//! catalog, enroll, and manage their own profile. **Instructors** own courses
//! and their lessons, see their rosters, and may read student records.
//! **Admins** administer everything. Each request carries a signed bearer
//! token; the server resolves it into a per-request principal and every
//! sensitive handler checks that principal against a role- and
//! ownership-based policy before touching data.
//!
//! ### Request Flow
//!
//! A client logs in with a username, password, and claimed role. Credentials
//! are verified against the matching account partition and, on success, a
//! compact HMAC-signed token is returned. Subsequent requests attach the
//! token as `Authorization: Bearer <token>`; middleware-free extractors
//! ([`auth::current_user`]) decode it per request, and handlers consult
//! [`auth::policy`] for the fine-grained access decision. Tokens are
//! self-contained and never revoked server-side: validity is signature plus
//! expiry, nothing else, so any replica can validate without shared state.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) holds the axum handlers and the
//! request/response models, documented with OpenAPI annotations and served at
//! `/docs`.
//!
//! The **authentication layer** ([`auth`]) provides Argon2 password hashing,
//! the bearer token codec, the per-request identity extractor, and the pure
//! access-control policy.
//!
//! The **database layer** ([`db`]) uses the repository pattern over SQLx:
//! one repository per table, composable with transactions. All three account
//! roles share a single table with a role discriminant; usernames and emails
//! are unique per role, and uniqueness across roles is enforced by the
//! registration flow.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use lmsctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = lmsctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     lmsctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::{password, token::TokenCodec},
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, patch, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

pub use types::{CourseId, EnrollmentId, LessonId, UserId};

/// Application state shared across all request handlers.
///
/// Everything here is read-only for the lifetime of the process: the
/// connection pool, the loaded configuration, and the token codec built from
/// it. Request handlers never share any other mutable state.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub token_codec: TokenCodec,
}

/// Get the lmsctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// This function is idempotent - it will create a new admin user if one
/// doesn't exist, or update the password if the user already exists. Called
/// during application startup so there is always an admin account available.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(username: &str, email: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => password::hash_password(pwd).map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?,
        // No password configured: an unloggable placeholder that will never
        // verify (it is not a valid PHC string)
        None => "!locked".to_string(),
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing) = user_repo.find_by_username_and_role(username, Role::Admin).await? {
        if password.is_some() {
            user_repo
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        password_hash: Some(password_hash),
                        ..Default::default()
                    },
                )
                .await?;
        }
        tx.commit().await?;
        return Ok(existing.id);
    }

    let created = user_repo
        .create(&UserCreateDBRequest {
            role: Role::Admin,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
        })
        .await?;

    tx.commit().await?;
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        let header_value = match origin {
            config::CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            config::CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// This constructs the complete axum router with:
/// - Authentication routes (login, registration)
/// - Account routes for students, instructors, and admins
/// - Course, lesson, and enrollment routes
/// - OpenAPI documentation at `/docs`
/// - CORS and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (public)
    let auth_routes = Router::new()
        .route(
            "/api/auth/register",
            get(api::handlers::auth::get_registration_info).post(api::handlers::auth::register),
        )
        .route("/api/auth/login", post(api::handlers::auth::login))
        .with_state(state.clone());

    // API routes (authorization enforced per handler)
    let api_routes = Router::new()
        // Students
        .route(
            "/api/students",
            get(api::handlers::users::list_students).post(api::handlers::users::create_student),
        )
        .route(
            "/api/students/{id}",
            get(api::handlers::users::get_student)
                .patch(api::handlers::users::update_student)
                .delete(api::handlers::users::delete_student),
        )
        .route(
            "/api/students/{id}/enrollments",
            get(api::handlers::enrollments::list_student_enrollments),
        )
        // Instructors
        .route(
            "/api/instructors",
            get(api::handlers::users::list_instructors).post(api::handlers::users::create_instructor),
        )
        .route(
            "/api/instructors/{id}",
            get(api::handlers::users::get_instructor)
                .patch(api::handlers::users::update_instructor)
                .delete(api::handlers::users::delete_instructor),
        )
        // Admins
        .route(
            "/api/admins",
            get(api::handlers::users::list_admins).post(api::handlers::users::create_admin),
        )
        .route(
            "/api/admins/{id}",
            get(api::handlers::users::get_admin)
                .patch(api::handlers::users::update_admin)
                .delete(api::handlers::users::delete_admin),
        )
        // Courses and lessons
        .route(
            "/api/courses",
            get(api::handlers::courses::list_courses).post(api::handlers::courses::create_course),
        )
        .route(
            "/api/courses/{id}",
            get(api::handlers::courses::get_course)
                .patch(api::handlers::courses::update_course)
                .delete(api::handlers::courses::delete_course),
        )
        .route(
            "/api/courses/{id}/lessons",
            get(api::handlers::courses::list_lessons).post(api::handlers::courses::create_lesson),
        )
        .route(
            "/api/courses/{id}/lessons/{lesson_id}",
            axum::routing::delete(api::handlers::courses::delete_lesson),
        )
        // Enrollments
        .route(
            "/api/courses/{id}/enrollments",
            get(api::handlers::enrollments::list_course_enrollments).post(api::handlers::enrollments::enroll_student),
        )
        .route("/api/enrollments/{id}", patch(api::handlers::enrollments::update_enrollment))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(api_routes)
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and bootstraps the initial admin account
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
/// 3. **Shutdown**: on the shutdown signal, the server drains and the pool closes
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPool::connect(&config.database_url).await?;
        Self::new_with_pool(config, pool).await
    }

    /// Create an application on an existing connection pool (used by tests)
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_username, &config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let token_codec = TokenCodec::from_config(&config)?;
        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .token_codec(token_codec)
            .build();

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("lmsctl listening on http://{bind_addr}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
