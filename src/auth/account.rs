//! Admin account model as persisted in `admin_accounts`.

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::net::IpAddr;
use uuid::Uuid;

/// Role carried by an admin account and echoed into session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Staff,
    Admin,
    SuperAdmin,
}

impl AdminRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse the persisted `admin_accounts.role` textual value into a typed enum.
    fn from_db(value: &str) -> Result<Self, sqlx::Error> {
        match value {
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid admin_accounts.role value: {value}"),
            )))),
        }
    }

    /// Whether the role may perform account administration on other admins.
    #[must_use]
    pub fn manages_accounts(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: AdminRole,
    pub password_hash: String,
    pub failed_logins: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub totp_enabled: bool,
    pub totp_secret: Option<String>,
    pub allowed_networks: Vec<IpNetwork>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    /// Returns the lock expiry when the account is still locked at `now`.
    #[must_use]
    pub fn locked_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until.filter(|until| *until > now)
    }

    /// Checks `source` against the account allow-list.
    ///
    /// An empty list imposes no restriction. A non-empty list requires a known
    /// source address inside one of the listed networks.
    #[must_use]
    pub fn address_allowed(&self, source: Option<IpAddr>) -> bool {
        if self.allowed_networks.is_empty() {
            return true;
        }
        source.is_some_and(|ip| {
            self.allowed_networks
                .iter()
                .any(|network| network.contains(ip))
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AdminAccount {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            account_id: row.try_get("account_id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            role: AdminRole::from_db(&role)?,
            password_hash: row.try_get("password_hash")?,
            failed_logins: row.try_get("failed_logins")?,
            locked_until: row.try_get("locked_until")?,
            totp_enabled: row.try_get("totp_enabled")?,
            totp_secret: row.try_get("totp_secret")?,
            allowed_networks: row.try_get("allowed_networks")?,
            is_active: row.try_get("is_active")?,
            last_login_at: row.try_get("last_login_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account() -> AdminAccount {
        let now = Utc::now();
        AdminAccount {
            account_id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@washgate.app".to_string(),
            display_name: "Alice".to_string(),
            role: AdminRole::Admin,
            password_hash: String::new(),
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

    #[test]
    fn role_round_trips_through_db_values() {
        for role in [AdminRole::Staff, AdminRole::Admin, AdminRole::SuperAdmin] {
            assert_eq!(AdminRole::from_db(role.as_str()).unwrap(), role);
        }
        assert!(AdminRole::from_db("root").is_err());
    }

    #[test]
    fn staff_does_not_manage_accounts() {
        assert!(!AdminRole::Staff.manages_accounts());
        assert!(AdminRole::Admin.manages_accounts());
        assert!(AdminRole::SuperAdmin.manages_accounts());
    }

    #[test]
    fn locked_at_only_for_future_expiry() {
        let now = Utc::now();
        let mut acct = account();
        assert_eq!(acct.locked_at(now), None);

        acct.locked_until = Some(now - Duration::seconds(1));
        assert_eq!(acct.locked_at(now), None);

        let until = now + Duration::minutes(15);
        acct.locked_until = Some(until);
        assert_eq!(acct.locked_at(now), Some(until));
    }

    #[test]
    fn empty_allow_list_is_unrestricted() {
        let acct = account();
        assert!(acct.address_allowed(None));
        assert!(acct.address_allowed(Some("203.0.113.9".parse().unwrap())));
    }

    #[test]
    fn allow_list_requires_member_address() {
        let mut acct = account();
        acct.allowed_networks = vec!["10.20.0.0/16".parse().unwrap()];
        assert!(acct.address_allowed(Some("10.20.3.4".parse().unwrap())));
        assert!(!acct.address_allowed(Some("10.21.0.1".parse().unwrap())));
        // Unknown source cannot satisfy a non-empty allow-list.
        assert!(!acct.address_allowed(None));
    }
}
