//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/api/auth/*`): Login and registration
//! - **Students** (`/api/students/*`): Student account management
//! - **Instructors** (`/api/instructors/*`): Instructor account management
//! - **Admins** (`/api/admins/*`): Admin account management
//! - **Courses** (`/api/courses/*`): Course catalog, lessons, and enrollment
//! - **Enrollments** (`/api/enrollments/*`): Enrollment status transitions
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
