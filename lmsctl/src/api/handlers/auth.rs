use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, RegistrationInfo},
        users::Role,
    },
    auth::{AuthError, password},
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
    types::Operation,
};

/// Get registration information
#[utoipa::path(
    get,
    path = "/api/auth/register",
    tag = "authentication",
    responses(
        (status = 200, description = "Registration info", body = RegistrationInfo),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_registration_info(State(state): State<AppState>) -> Result<Json<RegistrationInfo>, Error> {
    let enabled = state.config.auth.allow_registration;
    Ok(Json(RegistrationInfo {
        enabled,
        message: if enabled {
            "Registration is enabled".to_string()
        } else {
            "Registration is disabled".to_string()
        },
    }))
}

/// Login with username, password, and claimed role
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Unknown user type"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    // Dispatch to exactly one role partition; no fallback search
    let role = Role::parse_user_type(&request.user_type)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // An unknown username and a wrong password must be indistinguishable to
    // the caller, so both fall through to the same error
    let user = user_repo
        .find_by_username_and_role(&request.username, role)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    // Verify password on a blocking thread to avoid blocking the async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?;

    if !is_valid {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.token_codec.issue(&user.username, user.role, user.id)?;

    Ok(Json(AuthResponse::bearer(token, user.username, user.role, user.id)))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "Account registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input or registration disabled"),
        (status = 403, description = "Admin registration is not open"),
        (status = 409, description = "Username or email already in use"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let role = Role::parse_user_type(&request.user_type)?;

    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "Registration is disabled".to_string(),
        });
    }

    // Admin self-signup is an explicit deployment choice, off by default
    if role == Role::Admin && !state.config.auth.open_admin_creation {
        return Err(Error::AccessDenied {
            action: Operation::Create,
            resource: "admin accounts".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    // Uniqueness is checked across every role partition, not just the target
    // one: a student and an instructor can never share a username
    if user_repo.username_exists(&request.username).await? {
        return Err(AuthError::UsernameTaken.into());
    }
    if user_repo.email_exists(&request.email).await? {
        return Err(AuthError::EmailTaken.into());
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let password = request.password.clone();
    let params = password::Argon2Params::from(password_config);
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        role,
        username: request.username,
        email: request.email,
        password_hash,
        first_name: request.first_name,
        last_name: request.last_name,
    };

    // The pre-checks above are not atomic with the insert; the unique index
    // is the backstop for concurrent registrations of the same name
    let created = match user_repo.create(&create_request).await {
        Ok(user) => user,
        Err(DbError::UniqueViolation { constraint, .. }) => {
            let taken = if constraint.as_deref().is_some_and(|c| c.contains("email")) {
                AuthError::EmailTaken
            } else {
                AuthError::UsernameTaken
            };
            return Err(taken.into());
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let token = state.token_codec.issue(&created.username, created.role, created.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::bearer(token, created.username, created.role, created.id)),
    ))
}
