//! Handlers for student, instructor, and admin account routes.
//!
//! The three route families share one implementation: accounts live in a
//! single table with a role discriminant, so each `/api/students`-style
//! handler is a thin wrapper that pins the role and resource kind. The
//! authorization differences between the families live entirely in
//! [`policy::can_access`] / [`policy::can_list`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::users::{CurrentUser, ListUsersQuery, Role, UserCreate, UserResponse, UserUpdate},
    auth::{AuthError, password, policy},
    db::{
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    types::{Operation, UserId},
};

fn resource_name(role: Role) -> &'static str {
    match role {
        Role::Student => "Student",
        Role::Instructor => "Instructor",
        Role::Admin => "Admin",
    }
}

async fn list_accounts(state: AppState, user: CurrentUser, role: Role, query: ListUsersQuery) -> Result<Json<Vec<UserResponse>>, Error> {
    policy::ensure_can_list(&user, role.resource_kind())?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let filter = UserFilter {
        role: Some(role),
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(100).min(1000),
    };
    let users = repo.list(&filter).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

async fn create_account(
    state: AppState,
    user: CurrentUser,
    role: Role,
    request: UserCreate,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    policy::ensure_admin(&user, Operation::Create, format!("{} accounts", role.resource_kind()))?;

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
    let mut repo = Users::new(&mut tx);

    // Admin-created accounts obey the same cross-partition uniqueness rule
    // as self-registration
    if repo.username_exists(&request.username).await? {
        return Err(AuthError::UsernameTaken.into());
    }
    if repo.email_exists(&request.email).await? {
        return Err(AuthError::EmailTaken.into());
    }

    let params = password::Argon2Params::from(password_config);
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created = repo
        .create(&UserCreateDBRequest {
            role,
            username: request.username,
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

async fn get_account(state: AppState, user: CurrentUser, role: Role, id: UserId) -> Result<Json<UserResponse>, Error> {
    policy::ensure_can_access(&user, id, role.resource_kind(), Operation::Read)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let account = repo
        .find_by_id_and_role(id, role)
        .await?
        .ok_or_else(|| Error::not_found(resource_name(role), id))?;

    Ok(Json(UserResponse::from(account)))
}

async fn update_account(
    state: AppState,
    user: CurrentUser,
    role: Role,
    id: UserId,
    request: UserUpdate,
) -> Result<Json<UserResponse>, Error> {
    policy::ensure_can_access(&user, id, role.resource_kind(), Operation::Update)?;

    let password_hash = match request.password {
        Some(new_password) => {
            let password_config = &state.config.auth.password;
            if new_password.len() < password_config.min_length {
                return Err(Error::BadRequest {
                    message: format!("Password must be at least {} characters", password_config.min_length),
                });
            }
            let params = password::Argon2Params::from(password_config);
            Some(
                tokio::task::spawn_blocking(move || password::hash_password_with_params(&new_password, Some(params)))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn password hashing task: {e}"),
                    })??,
            )
        }
        None => None,
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    // The id must exist in this role partition; a matching id under another
    // role is someone else's record
    repo.find_by_id_and_role(id, role)
        .await?
        .ok_or_else(|| Error::not_found(resource_name(role), id))?;

    let updated = repo
        .update(
            id,
            &UserUpdateDBRequest {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

async fn delete_account(state: AppState, user: CurrentUser, role: Role, id: UserId) -> Result<StatusCode, Error> {
    policy::ensure_can_access(&user, id, role.resource_kind(), Operation::Delete)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    repo.find_by_id_and_role(id, role)
        .await?
        .ok_or_else(|| Error::not_found(resource_name(role), id))?;

    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// Students

/// List all students (admin or instructor only)
#[utoipa::path(
    get,
    path = "/api/students",
    tag = "students",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of students", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - students may not list students"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_students(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    list_accounts(state, user, Role::Student, query).await
}

/// Create a student account (admin only)
#[utoipa::path(
    post,
    path = "/api/students",
    tag = "students",
    request_body = UserCreate,
    responses(
        (status = 201, description = "Student created", body = UserResponse),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 409, description = "Username or email already in use"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    create_account(state, user, Role::Student, request).await
}

/// Get a student by id (self, instructor, or admin)
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student record", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_student(State(state): State<AppState>, user: CurrentUser, Path(id): Path<UserId>) -> Result<Json<UserResponse>, Error> {
    get_account(state, user, Role::Student, id).await
}

/// Update a student (self or admin)
#[utoipa::path(
    patch,
    path = "/api/students/{id}",
    tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Student updated", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    update_account(state, user, Role::Student, id, request).await
}

/// Delete a student (self or admin)
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_student(State(state): State<AppState>, user: CurrentUser, Path(id): Path<UserId>) -> Result<StatusCode, Error> {
    delete_account(state, user, Role::Student, id).await
}

// Instructors

/// List all instructors (admin only)
#[utoipa::path(
    get,
    path = "/api/instructors",
    tag = "instructors",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of instructors", body = [UserResponse]),
        (status = 403, description = "Forbidden - admin access required"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_instructors(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    list_accounts(state, user, Role::Instructor, query).await
}

/// Create an instructor account (admin only)
#[utoipa::path(
    post,
    path = "/api/instructors",
    tag = "instructors",
    request_body = UserCreate,
    responses(
        (status = 201, description = "Instructor created", body = UserResponse),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 409, description = "Username or email already in use"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_instructor(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    create_account(state, user, Role::Instructor, request).await
}

/// Get an instructor by id (self or admin; other instructors are denied)
#[utoipa::path(
    get,
    path = "/api/instructors/{id}",
    tag = "instructors",
    params(("id" = i32, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor record", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Instructor not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_instructor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    get_account(state, user, Role::Instructor, id).await
}

/// Update an instructor (self or admin)
#[utoipa::path(
    patch,
    path = "/api/instructors/{id}",
    tag = "instructors",
    params(("id" = i32, Path, description = "Instructor ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Instructor updated", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Instructor not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_instructor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    update_account(state, user, Role::Instructor, id, request).await
}

/// Delete an instructor (self or admin)
#[utoipa::path(
    delete,
    path = "/api/instructors/{id}",
    tag = "instructors",
    params(("id" = i32, Path, description = "Instructor ID")),
    responses(
        (status = 204, description = "Instructor deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Instructor not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_instructor(State(state): State<AppState>, user: CurrentUser, Path(id): Path<UserId>) -> Result<StatusCode, Error> {
    delete_account(state, user, Role::Instructor, id).await
}

// Admins

/// List all admins (admin only)
#[utoipa::path(
    get,
    path = "/api/admins",
    tag = "admins",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of admins", body = [UserResponse]),
        (status = 403, description = "Forbidden - admin access required"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_admins(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    list_accounts(state, user, Role::Admin, query).await
}

/// Create an admin account.
///
/// Requires an authenticated admin unless `auth.open_admin_creation` is set,
/// in which case the route is public.
#[utoipa::path(
    post,
    path = "/api/admins",
    tag = "admins",
    request_body = UserCreate,
    responses(
        (status = 201, description = "Admin created", body = UserResponse),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 409, description = "Username or email already in use"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_admin(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    if state.config.auth.open_admin_creation {
        // Public admin creation: skip the admin gate but keep the rest of the flow
        let acting_as_admin = CurrentUser {
            id: 0,
            username: "anonymous".to_string(),
            role: Role::Admin,
        };
        return create_account(state, acting_as_admin, Role::Admin, request).await;
    }

    let user = user.ok_or(Error::Unauthenticated { message: None })?;
    create_account(state, user, Role::Admin, request).await
}

/// Get an admin by id (self or any admin)
#[utoipa::path(
    get,
    path = "/api/admins/{id}",
    tag = "admins",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin record", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_admin(State(state): State<AppState>, user: CurrentUser, Path(id): Path<UserId>) -> Result<Json<UserResponse>, Error> {
    get_account(state, user, Role::Admin, id).await
}

/// Update an admin (admin only)
#[utoipa::path(
    patch,
    path = "/api/admins/{id}",
    tag = "admins",
    params(("id" = i32, Path, description = "Admin ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Admin updated", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_admin(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    update_account(state, user, Role::Admin, id, request).await
}

/// Delete an admin (admin only)
#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    tag = "admins",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 204, description = "Admin deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_admin(State(state): State<AppState>, user: CurrentUser, Path(id): Path<UserId>) -> Result<StatusCode, Error> {
    delete_account(state, user, Role::Admin, id).await
}
