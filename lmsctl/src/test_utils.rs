//! Test utilities for integration testing (available with `test-utils` feature).

use std::sync::atomic::{AtomicU32, Ordering};

use sqlx::PgPool;

use crate::{
    AppState,
    api::models::users::Role,
    auth::{
        password::{self, Argon2Params},
        token::TokenCodec,
    },
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};

/// Password every test account is created with.
pub const TEST_PASSWORD: &str = "password123";

static USER_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    // Cheap hashing parameters keep per-test account creation fast
    config.auth.password.argon2_memory_kib = 8;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config
}

pub async fn create_test_state(pool: PgPool) -> AppState {
    create_test_state_with_config(pool, create_test_config()).await
}

pub async fn create_test_state_with_config(pool: PgPool, config: Config) -> AppState {
    let token_codec = TokenCodec::from_config(&config).expect("test config has a secret key");
    AppState::builder().db(pool).config(config).token_codec(token_codec).build()
}

/// Create an account in the given role with a unique username and the
/// standard [`TEST_PASSWORD`].
pub async fn create_test_user(state: &AppState, role: Role) -> UserDBResponse {
    let n = USER_COUNTER.fetch_add(1, Ordering::Relaxed);
    let username = format!("testuser{n}");

    let params = Argon2Params::from(&state.config.auth.password);
    let password_hash = password::hash_password_with_params(TEST_PASSWORD, Some(params)).expect("hashing test password");

    let mut conn = state.db.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);

    users_repo
        .create(&UserCreateDBRequest {
            role,
            username: username.clone(),
            email: format!("{username}@example.com"),
            password_hash,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        })
        .await
        .expect("Failed to create test user")
}

/// `Authorization` header value carrying a freshly issued token for `user`.
pub fn bearer_for(state: &AppState, user: &UserDBResponse) -> String {
    let token = state
        .token_codec
        .issue(&user.username, user.role, user.id)
        .expect("issue test token");
    format!("Bearer {token}")
}
