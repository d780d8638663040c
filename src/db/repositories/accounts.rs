use crate::{
    db::models::account_models::{Account, Role},
    db::repositories::AccountStore,
    error::Error,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone_number, \
     profile_picture, role, active, created_at, updated_at, last_login";

/// Accounts repository for handling identity rows
#[derive(Clone)]
pub struct AccountsRepository {
    pool: Arc<PgPool>,
}

impl AccountsRepository {
    /// Create a new accounts repository
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountsRepository {
    async fn create(&self, account: &Account) -> Result<Account> {
        info!("Creating new account: {}", account.email);

        let sql = format!(
            r#"
            INSERT INTO accounts (id, email, password_hash, first_name, last_name, phone_number,
                                  profile_picture, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.phone_number)
            .bind(&account.profile_picture)
            .bind(account.role)
            .bind(account.active)
            .bind(account.created_at)
            .bind(account.updated_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::AlreadyExists("Email already registered".to_string())
                }
                _ => Error::Database(format!("Failed to create account: {}", e)),
            })?;

        Ok(result)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get account by ID: {}", e)))?;

        Ok(result)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE email = $1", ACCOUNT_COLUMNS);
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get account by email: {}", e)))?;

        Ok(result)
    }

    async fn update(&self, account: &Account) -> Result<Account> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET first_name = $1, last_name = $2, phone_number = $3, profile_picture = $4,
                password_hash = $5, role = $6, active = $7, updated_at = $8
            WHERE id = $9
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.phone_number)
            .bind(&account.profile_picture)
            .bind(&account.password_hash)
            .bind(account.role)
            .bind(account.active)
            .bind(Utc::now())
            .bind(account.id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to update account: {}", e)))?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

        Ok(result)
    }

    async fn update_last_login(&self, id: &Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET last_login = $1
            WHERE id = $2
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to update last login: {}", e)))?;

        Ok(())
    }

    async fn get_by_role(&self, role: Role) -> Result<Vec<Account>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE role = $1 ORDER BY email",
            ACCOUNT_COLUMNS
        );
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(role)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get accounts by role: {}", e)))?;

        Ok(result)
    }

    async fn count_by_role(&self, role: Role) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = $1")
            .bind(role)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count accounts: {}", e)))?;

        Ok(count)
    }
}
