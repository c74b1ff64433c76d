//! UserService: provisioning users and resolving bearer tokens.

use super::{ServiceError, ServiceResult, is_unique_violation};
use crate::models::user::{User, UserRoles};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, api_token, is_active, is_superuser, is_fox, created_at";

#[derive(Clone)]
pub struct UserService {
    pub db: Arc<SqlitePool>,
}

impl UserService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create an active user with a freshly generated API token.
    pub async fn create_user(&self, username: &str, roles: UserRoles) -> ServiceResult<User> {
        let token = Uuid::new_v4().simple().to_string();

        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, api_token, is_active, is_superuser, is_fox, created_at)
             VALUES (?, ?, 1, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(&token)
        .bind(roles.superuser)
        .bind(roles.fox)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::DuplicateUsername(username.to_string())
            } else {
                ServiceError::Sqlx(err)
            }
        })
    }

    /// Resolve a bearer token to an active user.
    pub async fn find_by_token(&self, token: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE api_token = ? AND is_active = 1"
        ))
        .bind(token)
        .fetch_optional(&*self.db)
        .await?;

        Ok(user)
    }

    pub async fn set_active(&self, user_id: i64, active: bool) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(user_id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("user", user_id));
        }
        Ok(())
    }
}
