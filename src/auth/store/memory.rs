//! In-memory admin store used as a test double.
//!
//! Mirrors the conditional-update semantics of the Postgres store so service
//! tests exercise the same state transitions without a database.

#![allow(clippy::unwrap_used)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{AdminStore, LockoutState};
use crate::auth::account::{AdminAccount, AdminRole};

#[derive(Default)]
pub(crate) struct MemoryAdminStore {
    accounts: Mutex<HashMap<Uuid, AdminAccount>>,
    recovery: Mutex<HashMap<Uuid, (Uuid, Vec<String>)>>,
}

impl MemoryAdminStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, account: AdminAccount) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.account_id, account);
    }

    /// Snapshot of the stored record, for assertions.
    pub(crate) fn snapshot(&self, account_id: Uuid) -> AdminAccount {
        self.accounts
            .lock()
            .unwrap()
            .get(&account_id)
            .cloned()
            .expect("account present")
    }

    /// Direct mutation hook for simulating out-of-band edits (drift, locks).
    pub(crate) fn update<F: FnOnce(&mut AdminAccount)>(&self, account_id: Uuid, mutate: F) {
        let mut accounts = self.accounts.lock().unwrap();
        mutate(accounts.get_mut(&account_id).expect("account present"));
    }

    pub(crate) fn recovery_hashes(&self, account_id: Uuid) -> Vec<String> {
        self.recovery
            .lock()
            .unwrap()
            .get(&account_id)
            .map(|(_, hashes)| hashes.clone())
            .unwrap_or_default()
    }
}

/// Fresh active account with no two-factor state.
pub(crate) fn test_account(username: &str, password_hash: &str) -> AdminAccount {
    let now = Utc::now();
    AdminAccount {
        account_id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@washgate.app"),
        display_name: username.to_string(),
        role: AdminRole::Admin,
        password_hash: password_hash.to_string(),
        failed_logins: 0,
        locked_until: None,
        totp_enabled: false,
        totp_secret: None,
        allowed_networks: Vec::new(),
        is_active: true,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<AdminAccount>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|account| account.username == login || account.email == login)
            .cloned())
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AdminAccount>> {
        Ok(self.accounts.lock().unwrap().get(&account_id).cloned())
    }

    async fn record_login_failure(
        &self,
        account_id: Uuid,
        threshold: u32,
        lock_seconds: i64,
    ) -> Result<LockoutState> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&account_id).expect("account present");
        account.failed_logins += 1;
        if account.failed_logins >= i32::try_from(threshold).unwrap_or(i32::MAX) {
            account.locked_until = Some(Utc::now() + Duration::seconds(lock_seconds));
        }
        account.updated_at = Utc::now();
        Ok(LockoutState {
            failed_logins: account.failed_logins,
            locked_until: account.locked_until,
        })
    }

    async fn record_login_success(&self, account_id: Uuid) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&account_id).expect("account present");
        account.failed_logins = 0;
        account.locked_until = None;
        account.last_login_at = Some(Utc::now());
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn store_pending_secret(
        &self,
        account_id: Uuid,
        secret_base32: &str,
        batch_id: Uuid,
        code_hashes: &[String],
    ) -> Result<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get_mut(&account_id) else {
            return Ok(false);
        };
        account.totp_secret = Some(secret_base32.to_string());
        account.updated_at = Utc::now();
        self.recovery
            .lock()
            .unwrap()
            .insert(account_id, (batch_id, code_hashes.to_vec()));
        Ok(true)
    }

    async fn enable_two_factor(&self, account_id: Uuid) -> Result<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get_mut(&account_id) else {
            return Ok(false);
        };
        if account.totp_secret.is_none() {
            return Ok(false);
        }
        account.totp_enabled = true;
        account.failed_logins = 0;
        account.locked_until = None;
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn reset_two_factor(&self, account_id: Uuid) -> Result<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get_mut(&account_id) else {
            return Ok(false);
        };
        account.totp_enabled = false;
        account.totp_secret = None;
        account.updated_at = Utc::now();
        self.recovery.lock().unwrap().remove(&account_id);
        Ok(true)
    }
}
