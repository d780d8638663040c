use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
///
/// Closed set: an account is an officer, an admin, or neither.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field account that submits attendance, reports and alarms
    Officer,
    /// Reviews and aggregates officer data
    Admin,
    /// Authenticated but holds no role
    Unassigned,
}

text_enum!(Role {
    Officer => "officer" | "petugas",
    Admin => "admin",
    Unassigned => "unassigned",
});

impl Default for Role {
    fn default() -> Self {
        Role::Officer
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// Build a fresh, active account with the given role
    pub fn new(email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            phone_number: None,
            profile_picture: None,
            role,
            active: true,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// "first last", or the email when both are blank
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// Account as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub is_admin: bool,
    pub is_officer: bool,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            full_name: account.full_name(),
            phone_number: account.phone_number.clone(),
            profile_picture: account.profile_picture.clone(),
            role: account.role,
            is_admin: account.role == Role::Admin,
            is_officer: account.role == Role::Officer,
            active: account.active,
            last_login: account.last_login,
            created_at: account.created_at,
        }
    }
}

/// Authentication tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Self-service registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Admin-created account with an explicit role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccountRequest {
    #[serde(flatten)]
    pub account: RegisterRequest,
    pub role: String,
}

/// Fields an account holder may change on their own profile.
///
/// Role, email and activation are not part of it; unknown JSON keys are
/// dropped on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Media reference of an already stored upload
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveUpdate {
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_falls_back_to_email() {
        let mut account = Account::new("a@patrol.id", String::new(), Role::Officer);
        assert_eq!(account.full_name(), "a@patrol.id");

        account.first_name = "Budi".to_string();
        assert_eq!(account.full_name(), "Budi");

        account.last_name = "Santoso".to_string();
        assert_eq!(account.full_name(), "Budi Santoso");
    }

    #[test]
    fn profile_update_ignores_privileged_fields() {
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"first_name": "Sari", "role": "admin", "email": "x@y.z", "active": false}"#,
        )
        .unwrap();
        assert_eq!(update.first_name.as_deref(), Some("Sari"));
        assert!(update.phone_number.is_none());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let account = Account::new("a@patrol.id", "$2b$04$secret".to_string(), Role::Admin);
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret"));

        let profile = AccountProfile::from(&account);
        assert!(profile.is_admin);
        assert!(!profile.is_officer);
    }
}
