//! Postgres-backed admin store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{AdminStore, LockoutState};
use crate::auth::account::AdminAccount;

#[derive(Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<AdminAccount>> {
        let query = "SELECT * FROM admin_accounts WHERE username = $1 OR email = $1";
        sqlx::query_as::<_, AdminAccount>(query)
            .bind(login)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to look up admin account by login")
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AdminAccount>> {
        let query = "SELECT * FROM admin_accounts WHERE account_id = $1";
        sqlx::query_as::<_, AdminAccount>(query)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to look up admin account by id")
    }

    async fn record_login_failure(
        &self,
        account_id: Uuid,
        threshold: u32,
        lock_seconds: i64,
    ) -> Result<LockoutState> {
        // Single statement so concurrent failures never lose an increment,
        // and the lock transition happens on the same row version.
        let query = r"
            UPDATE admin_accounts
            SET failed_logins = failed_logins + 1,
                locked_until = CASE
                    WHEN failed_logins + 1 >= $2
                        THEN now() + ($3 * interval '1 second')
                    ELSE locked_until
                END,
                updated_at = now()
            WHERE account_id = $1
            RETURNING failed_logins, locked_until
            ";
        let row = sqlx::query(query)
            .bind(account_id)
            .bind(i64::from(threshold))
            .bind(lock_seconds)
            .fetch_one(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to record login failure")?;

        Ok(LockoutState {
            failed_logins: row.get("failed_logins"),
            locked_until: row.get::<Option<DateTime<Utc>>, _>("locked_until"),
        })
    }

    async fn record_login_success(&self, account_id: Uuid) -> Result<()> {
        let query = r"
            UPDATE admin_accounts
            SET failed_logins = 0,
                locked_until = NULL,
                last_login_at = now(),
                updated_at = now()
            WHERE account_id = $1
            ";
        sqlx::query(query)
            .bind(account_id)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to record login success")?;
        Ok(())
    }

    async fn store_pending_secret(
        &self,
        account_id: Uuid,
        secret_base32: &str,
        batch_id: Uuid,
        code_hashes: &[String],
    ) -> Result<bool> {
        // Secret write and recovery-batch replacement stay consistent.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("begin enrollment transaction")?;

        let query = r"
            UPDATE admin_accounts
            SET totp_secret = $2, updated_at = now()
            WHERE account_id = $1
            ";
        let updated = sqlx::query(query)
            .bind(account_id)
            .bind(secret_base32)
            .execute(&mut *tx)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to store pending two-factor secret")?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Ok(false);
        }

        sqlx::query("DELETE FROM admin_recovery_codes WHERE account_id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .context("failed to drop previous recovery codes")?;

        sqlx::query(
            r"
            INSERT INTO admin_recovery_codes (account_id, batch_id, code_hash)
            SELECT $1, $2, unnest($3::text[])
            ",
        )
        .bind(account_id)
        .bind(batch_id)
        .bind(code_hashes)
        .execute(&mut *tx)
        .await
        .context("failed to insert recovery codes")?;

        tx.commit().await.context("commit enrollment transaction")?;
        Ok(true)
    }

    async fn enable_two_factor(&self, account_id: Uuid) -> Result<bool> {
        let query = r"
            UPDATE admin_accounts
            SET totp_enabled = TRUE,
                failed_logins = 0,
                locked_until = NULL,
                updated_at = now()
            WHERE account_id = $1 AND totp_secret IS NOT NULL
            ";
        let updated = sqlx::query(query)
            .bind(account_id)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to enable two-factor")?;
        Ok(updated.rows_affected() > 0)
    }

    async fn reset_two_factor(&self, account_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("begin reset transaction")?;

        let query = r"
            UPDATE admin_accounts
            SET totp_enabled = FALSE,
                totp_secret = NULL,
                updated_at = now()
            WHERE account_id = $1
            ";
        let updated = sqlx::query(query)
            .bind(account_id)
            .execute(&mut *tx)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to reset two-factor")?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Ok(false);
        }

        sqlx::query("DELETE FROM admin_recovery_codes WHERE account_id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .context("failed to drop recovery codes on reset")?;

        tx.commit().await.context("commit reset transaction")?;
        Ok(true)
    }
}
