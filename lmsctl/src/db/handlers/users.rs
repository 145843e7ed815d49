//! Database repository for user accounts.

use crate::{
    api::models::users::Role,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    types::UserId,
};
use sqlx::PgConnection;
use tracing::instrument;

const USER_COLUMNS: &str = "id, role, username, email, password_hash, first_name, last_name, created_at, updated_at";

/// Filter for listing accounts
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn by_role(role: Role) -> Self {
        Self {
            role: Some(role),
            skip: 0,
            limit: 100,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username, role = ?request.role), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            INSERT INTO users (role, username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.role)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), fields(role = ?filter.role, limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.role)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.password_hash)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Look up an account in a single role partition. Login dispatches here
    /// with the claimed role - there is no fallback search across roles.
    #[instrument(skip(self, username), fields(role = ?role), err)]
    pub async fn find_by_username_and_role(&mut self, username: &str, role: Role) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND role = $2"
        ))
        .bind(username)
        .bind(role)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user)
    }

    /// Fetch by id, constrained to a role partition. `/api/students/{id}`
    /// must 404 for an id that belongs to an instructor or admin.
    #[instrument(skip(self), fields(role = ?role), err)]
    pub async fn find_by_id_and_role(&mut self, id: UserId, role: Role) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"))
            .bind(id)
            .bind(role)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Look up an account by email within one role partition.
    #[instrument(skip(self, email), fields(role = ?role), err)]
    pub async fn find_by_email_and_role(&mut self, email: &str, role: Role) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = $2"))
            .bind(email)
            .bind(role)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Does any account, in any role partition, hold this username?
    #[instrument(skip_all, err)]
    pub async fn username_exists(&mut self, username: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }

    /// Does any account, in any role partition, hold this email?
    #[instrument(skip_all, err)]
    pub async fn email_exists(&mut self, email: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn student_request(username: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            role: Role::Student,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "fake-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_fetch_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&student_request("alice")).await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.role, Role::Student);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, "alice@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_find_by_username_is_role_scoped(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&student_request("casey")).await.unwrap();

        assert!(repo.find_by_username_and_role("casey", Role::Student).await.unwrap().is_some());
        // Same username under another role partition finds nothing
        assert!(repo.find_by_username_and_role("casey", Role::Instructor).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_find_by_id_is_role_scoped(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&student_request("drew")).await.unwrap();

        assert!(repo.find_by_id_and_role(created.id, Role::Student).await.unwrap().is_some());
        assert!(repo.find_by_id_and_role(created.id, Role::Admin).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_find_by_email_is_role_scoped(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&student_request("lena")).await.unwrap();

        let found = repo.find_by_email_and_role("lena@example.com", Role::Student).await.unwrap();
        assert_eq!(found.unwrap().username, "lena");
        assert!(repo.find_by_email_and_role("lena@example.com", Role::Admin).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_existence_checks_span_roles(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&student_request("erin")).await.unwrap();

        // The student partition holds the name, so it is taken everywhere
        assert!(repo.username_exists("erin").await.unwrap());
        assert!(repo.email_exists("erin@example.com").await.unwrap());
        assert!(!repo.username_exists("nobody").await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_same_username_in_different_partitions_is_storable(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&student_request("sam")).await.unwrap();

        // The composite constraint is per-role; the cross-role rule is
        // enforced by the registration flow, not the table
        let mut as_instructor = student_request("sam");
        as_instructor.role = Role::Instructor;
        assert!(repo.create(&as_instructor).await.is_ok());

        // But a second student named sam violates the partition constraint
        let err = repo.create(&student_request("sam")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_coalesces_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&student_request("fay")).await.unwrap();

        let update = UserUpdateDBRequest {
            first_name: Some("Faith".to_string()),
            ..Default::default()
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.first_name, "Faith");
        // Untouched fields keep their values
        assert_eq!(updated.email, "fay@example.com");
        assert_eq!(updated.password_hash, "fake-hash");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_user_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let err = repo.update(9999, &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_role(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&student_request("gia")).await.unwrap();
        let mut instructor = student_request("hal");
        instructor.role = Role::Instructor;
        repo.create(&instructor).await.unwrap();

        let students = repo.list(&UserFilter::by_role(Role::Student)).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].username, "gia");

        let everyone = repo
            .list(&UserFilter {
                role: None,
                skip: 0,
                limit: 100,
            })
            .await
            .unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&student_request("ivy")).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
