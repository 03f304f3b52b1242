use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::user::models::Session;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::SessionRepository;
use crate::user::errors::UserError;

/// Refresh token bindings in the `sessions` table, one row per user.
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn bind(&self, session: Session) -> Result<(), UserError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (user_id, refresh_token, issued_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET refresh_token = EXCLUDED.refresh_token, issued_at = EXCLUDED.issued_at
            "#,
        )
        .bind(session.user_id.0)
        .bind(&session.refresh_token)
        .bind(session.issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The user row was deleted between lookup and binding.
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return UserError::NotFound(session.user_id.to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        current_token: &str,
        next: Session,
    ) -> Result<bool, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET refresh_token = $3, issued_at = $4
            WHERE user_id = $1 AND refresh_token = $2
            "#,
        )
        .bind(user_id.0)
        .bind(current_token)
        .bind(&next.refresh_token)
        .bind(next.issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke(&self, user_id: &UserId) -> Result<(), UserError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
