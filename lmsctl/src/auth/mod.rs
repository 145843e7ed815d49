//! Authentication and authorization system.
//!
//! This module provides the auth core of the server:
//! - Password hashing and verification using Argon2
//! - Stateless bearer token issuance and validation
//! - Per-request identity resolution into a [`CurrentUser`] principal
//! - Role- and ownership-based access control
//!
//! # Authentication
//!
//! Clients log in via `POST /api/auth/login` with a username, password, and the
//! role they claim to hold (`student`, `instructor`, or `admin`). Credentials
//! are checked against the account record for exactly that role; there is no
//! fallback search across roles. On success the server returns a signed bearer
//! token carrying the username, role, and numeric user id.
//!
//! Tokens are self-contained: validity is determined solely by signature
//! integrity and the embedded expiry timestamp. There is no server-side session
//! store and no revocation list, which keeps verification free of I/O and lets
//! replicas validate tokens independently. The trade-off - no instant
//! de-authorization - is acceptable for this domain.
//!
//! # Authorization
//!
//! Access control is a pure decision over the resolved principal:
//!
//! - **Admins** may do anything.
//! - **Everyone** may read and modify their own account record.
//! - **Instructors** may additionally read student records, but not other
//!   instructors' records. That asymmetry is deliberate.
//!
//! Collection listings have coarser gates on top: students can never list all
//! students, and only admins can list instructors or admins.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors resolving the bearer token into the request principal
//! - [`password`]: Password hashing and verification using Argon2
//! - [`policy`]: Access-control decision functions
//! - [`token`]: Bearer token encoding and decoding
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use lmsctl::api::models::users::CurrentUser;
//! use lmsctl::auth::policy;
//! use lmsctl::types::{Operation, ResourceKind};
//!
//! async fn protected_handler(user: CurrentUser) -> Result<String, Error> {
//!     policy::ensure_can_access(&user, target_id, ResourceKind::Student, Operation::Read)?;
//!     Ok(format!("Hello, {}!", user.username))
//! }
//! ```

use axum::http::StatusCode;
use thiserror::Error;

pub mod current_user;
pub mod password;
pub mod policy;
pub mod token;

/// Credential, registration, and token failures.
///
/// Unknown-user and wrong-password both collapse into [`AuthError::InvalidCredentials`]
/// so responses cannot be used to enumerate accounts. Token failures keep their
/// kind for logging but all map to 401 outward.
#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid user type: {0}. Must be 'student', 'admin', or 'instructor'")]
    InvalidRole(String),

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already in use")]
    EmailTaken,

    #[error("Malformed token")]
    TokenMalformed,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    TokenSignatureInvalid,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::TokenMalformed | AuthError::TokenExpired | AuthError::TokenSignatureInvalid => StatusCode::UNAUTHORIZED,
        }
    }

    /// User-facing message. Token failures share one message so the response
    /// does not reveal why validation failed.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::TokenMalformed | AuthError::TokenExpired | AuthError::TokenSignatureInvalid => {
                "Invalid or expired token".to_string()
            }
            other => other.to_string(),
        }
    }
}
