use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{map_sqlx_error, PgStore};
use crate::database::models::{NewUser, Role, User, UserId};
use crate::database::store::{StoreError, StoreResult, UserStore};

const COLUMNS: &str = "id, email, username, password_hash, role, refresh_token_hash, \
     refresh_token_expires_at, created_at, modified_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    refresh_token_hash: Option<String>,
    refresh_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| StoreError::Query(format!("user {}: {}", row.id, e)))?;
        Ok(User {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            role,
            refresh_token_hash: row.refresh_token_hash,
            refresh_token_expires_at: row.refresh_token_expires_at,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

impl PgStore {
    async fn fetch_user(&self, filter: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", COLUMNS, filter);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.map(User::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn get_by_refresh_token(&self, token_hash: &str) -> StoreResult<Option<User>> {
        self.fetch_user("refresh_token_hash", token_hash).await
    }

    async fn add(&self, user: &NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (email, username, password_hash, role, created_at, modified_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        User::try_from(row)
    }

    async fn update(&self, id: UserId, user: &User) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, username = $3, password_hash = $4, role = $5, \
             refresh_token_hash = $6, refresh_token_expires_at = $7, modified_at = $8 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.refresh_token_hash)
        .bind(user.refresh_token_expires_at)
        .bind(user.modified_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: UserId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "UPDATE celestial_objects SET map_id = NULL, position_x = NULL, position_y = NULL, \
             position_z = NULL WHERE map_id IN (SELECT id FROM maps WHERE owner_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        // owned maps and objects go through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
