use crate::config::SecurityConfig;
use crate::db::models::account_models::{
    Account, AuthToken, LoginCredentials, NewAccountRequest, ProfileUpdate, RegisterRequest, Role,
};
use crate::db::models::{bounded_text, parse_choice};
use crate::db::repositories::AccountStore;
use crate::error::Error;
use crate::security::policy::{self, Action, Actor, RecordKind};
use crate::security::{password, SecurityService, TokenUse};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

const NAME_MAX_CHARS: usize = 150;
const PHONE_MAX_CHARS: usize = 15;
const RESET_PASSWORD_LENGTH: usize = 12;

/// Trim and lower-case the domain part; the local part keeps its case
pub fn normalize_email(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid("email", "Email is required").into());
    }
    if !EMAIL_PATTERN.is_match(raw) {
        return Err(Error::invalid("email", "Enter a valid email address").into());
    }

    let (local, domain) = raw
        .rsplit_once('@')
        .ok_or_else(|| Error::invalid("email", "Enter a valid email address"))?;
    Ok(format!("{}@{}", local, domain.to_lowercase()))
}

fn optional_phone(raw: Option<&str>) -> Result<Option<String>> {
    let phone = bounded_text("phone_number", raw, PHONE_MAX_CHARS)?;
    Ok(Some(phone).filter(|phone| !phone.is_empty()))
}

/// Authentication and account management over an account store
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    security: SecurityService,
    config: SecurityConfig,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(accounts: Arc<dyn AccountStore>, config: &SecurityConfig) -> Self {
        Self {
            accounts,
            security: SecurityService::new(config.clone()),
            config: config.clone(),
        }
    }

    async fn build_account(&self, request: &RegisterRequest, role: Role) -> Result<Account> {
        let email = normalize_email(&request.email)?;
        password::check_strength("password", &request.password)?;

        if self.accounts.get_by_email(&email).await?.is_some() {
            return Err(Error::AlreadyExists("Email already registered".to_string()).into());
        }

        let password_hash = password::hash_password(&request.password, &self.config)?;
        let mut account = Account::new(&email, password_hash, role);
        account.first_name = bounded_text("first_name", request.first_name.as_deref(), NAME_MAX_CHARS)?;
        account.last_name = bounded_text("last_name", request.last_name.as_deref(), NAME_MAX_CHARS)?;
        account.phone_number = optional_phone(request.phone_number.as_deref())?;

        self.accounts.create(&account).await
    }

    /// Self-service registration; always yields an active officer
    pub async fn register(&self, request: &RegisterRequest) -> Result<Account> {
        let account = self.build_account(request, Role::Officer).await?;

        info!("New officer registered: {}", account.email);

        Ok(account)
    }

    /// Exchange email and password for a token pair
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(Account, AuthToken)> {
        let rejected = || Error::Authentication("Invalid email or password".to_string());

        let email = normalize_email(&credentials.email).map_err(|_| rejected())?;
        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or_else(rejected)?;

        if !password::verify_password(&credentials.password, &account.password_hash)? {
            warn!("Rejected login for {}", email);
            return Err(rejected().into());
        }

        if !account.active {
            warn!("Rejected login for inactive account {}", email);
            return Err(Error::Authentication("Account is inactive".to_string()).into());
        }

        self.accounts.update_last_login(&account.id).await?;
        let token = self.security.generate_token(&account)?;

        info!("Account logged in: {}", account.email);

        Ok((account, token))
    }

    /// Trade a refresh token for a fresh pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthToken> {
        let data = self.security.validate_token(refresh_token, TokenUse::Refresh)?;
        let account = self.active_account(&data.claims.account_id()?).await?;

        self.security.generate_token(&account)
    }

    /// Resolve a bearer access token to the caller.
    ///
    /// The account is re-read so role changes and deactivation apply to
    /// tokens already issued.
    pub async fn resolve_actor(&self, access_token: &str) -> Result<Actor> {
        let data = self.security.validate_token(access_token, TokenUse::Access)?;
        let account = self.active_account(&data.claims.account_id()?).await?;

        Ok(Actor::from(&account))
    }

    async fn active_account(&self, id: &Uuid) -> Result<Account> {
        match self.accounts.get_by_id(id).await? {
            Some(account) if account.active => Ok(account),
            Some(_) => Err(Error::Authentication("Account is inactive".to_string()).into()),
            None => Err(Error::Authentication("Account no longer exists".to_string()).into()),
        }
    }

    async fn account(&self, id: &Uuid) -> Result<Account> {
        self.accounts
            .get_by_id(id)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::Account).into())
    }

    pub async fn profile(&self, actor: &Actor) -> Result<Account> {
        policy::require(actor, Action::Read, RecordKind::Account, Some(actor.id))?;
        self.account(&actor.id).await
    }

    /// Change the caller's own name, phone or picture
    pub async fn update_profile(&self, actor: &Actor, update: &ProfileUpdate) -> Result<Account> {
        policy::require(actor, Action::UpdateProfile, RecordKind::Account, Some(actor.id))?;
        let mut account = self.account(&actor.id).await?;

        if let Some(first_name) = update.first_name.as_deref() {
            account.first_name = bounded_text("first_name", Some(first_name), NAME_MAX_CHARS)?;
        }
        if let Some(last_name) = update.last_name.as_deref() {
            account.last_name = bounded_text("last_name", Some(last_name), NAME_MAX_CHARS)?;
        }
        if let Some(phone) = update.phone_number.as_deref() {
            account.phone_number = optional_phone(Some(phone))?;
        }
        if let Some(picture) = &update.profile_picture {
            account.profile_picture = Some(picture.clone());
        }

        let updated = self.accounts.update(&account).await?;

        info!("Profile updated for {}", updated.email);

        Ok(updated)
    }

    pub async fn change_password(&self, actor: &Actor, current_password: &str, new_password: &str) -> Result<()> {
        policy::require(actor, Action::UpdateProfile, RecordKind::Account, Some(actor.id))?;
        let mut account = self.account(&actor.id).await?;

        if !password::verify_password(current_password, &account.password_hash)? {
            return Err(Error::invalid("current_password", "Current password is incorrect").into());
        }
        password::check_strength("new_password", new_password)?;

        account.password_hash = password::hash_password(new_password, &self.config)?;
        self.accounts.update(&account).await?;

        info!("Password changed for {}", account.email);

        Ok(())
    }

    /// Admin: create an account holding any role
    pub async fn create_account(&self, actor: &Actor, request: &NewAccountRequest) -> Result<Account> {
        policy::require(actor, Action::ManageAccounts, RecordKind::Account, None)?;
        let role: Role = parse_choice("role", &request.role)?;

        let account = self.build_account(&request.account, role).await?;

        info!("Account {} created as {} by {}", account.email, role, actor.email);

        Ok(account)
    }

    pub async fn update_role(&self, actor: &Actor, id: &Uuid, role: &str) -> Result<Account> {
        policy::require(actor, Action::ManageAccounts, RecordKind::Account, Some(*id))?;
        let role: Role = parse_choice("role", role)?;

        let mut account = self.account(id).await?;
        account.role = role;
        let updated = self.accounts.update(&account).await?;

        info!("Role of {} set to {} by {}", updated.email, role, actor.email);

        Ok(updated)
    }

    pub async fn set_active(&self, actor: &Actor, id: &Uuid, active: bool) -> Result<Account> {
        policy::require(actor, Action::ManageAccounts, RecordKind::Account, Some(*id))?;

        let mut account = self.account(id).await?;
        account.active = active;
        let updated = self.accounts.update(&account).await?;

        info!(
            "Account {} {} by {}",
            updated.email,
            if active { "activated" } else { "deactivated" },
            actor.email
        );

        Ok(updated)
    }

    /// Admin: replace the password with a generated one and return it
    pub async fn reset_password(&self, actor: &Actor, id: &Uuid) -> Result<String> {
        policy::require(actor, Action::ManageAccounts, RecordKind::Account, Some(*id))?;

        let mut account = self.account(id).await?;
        let new_password = password::generate_random_password(RESET_PASSWORD_LENGTH);
        account.password_hash = password::hash_password(&new_password, &self.config)?;
        self.accounts.update(&account).await?;

        info!("Password reset for {} by {}", account.email, actor.email);

        Ok(new_password)
    }

    /// Admin: officer directory ordered by email
    pub async fn list_officers(&self, actor: &Actor) -> Result<Vec<Account>> {
        policy::require(actor, Action::ManageAccounts, RecordKind::Account, None)?;
        self.accounts.get_by_role(Role::Officer).await
    }

    pub async fn get_officer(&self, actor: &Actor, id: &Uuid) -> Result<Account> {
        policy::require(actor, Action::ManageAccounts, RecordKind::Account, Some(*id))?;

        match self.accounts.get_by_id(id).await? {
            Some(account) if account.role == Role::Officer => Ok(account),
            _ => Err(policy::not_found(RecordKind::Account).into()),
        }
    }

    /// Create an admin when the store holds none.
    ///
    /// An existing account with the same email is promoted and activated
    /// instead. Returns the admin when one was created or promoted.
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<Option<Account>> {
        if self.accounts.count_by_role(Role::Admin).await? > 0 {
            return Ok(None);
        }

        let email = normalize_email(email)?;
        if let Some(mut existing) = self.accounts.get_by_email(&email).await? {
            existing.role = Role::Admin;
            existing.active = true;
            let promoted = self.accounts.update(&existing).await?;
            warn!("Promoted existing account {} to admin", promoted.email);
            return Ok(Some(promoted));
        }

        let request = RegisterRequest {
            email,
            password: password.to_string(),
            ..RegisterRequest::default()
        };
        let admin = self.build_account(&request, Role::Admin).await?;

        info!("Bootstrap admin created: {}", admin.email);

        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::domain_error;
    use crate::db::repositories::Stores;
    use crate::testing::{self, Fixture};

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "rahasia123".to_string(),
            first_name: Some("Sari".to_string()),
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn email_domain_is_lowercased() {
        assert_eq!(normalize_email("  Budi@Patrol.ID ").unwrap(), "Budi@patrol.id");
        assert!(normalize_email("not-an-email").is_err());
        let err = normalize_email("").unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("email"));
    }

    #[tokio::test]
    async fn register_creates_active_officer_once() -> Result<()> {
        let fx = Fixture::new().await;
        let account = fx.auth.register(&register_request("new@Patrol.id")).await?;
        assert_eq!(account.role, Role::Officer);
        assert!(account.active);
        assert_eq!(account.email, "new@patrol.id");

        let err = fx.auth.register(&register_request("new@PATROL.ID")).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::AlreadyExists(_))));
        Ok(())
    }

    #[tokio::test]
    async fn login_issues_tokens_that_resolve_to_the_account() -> Result<()> {
        let fx = Fixture::new().await;
        let (account, token) = fx
            .auth
            .login(&LoginCredentials {
                email: fx.officer.email.clone(),
                password: Fixture::PASSWORD.to_string(),
            })
            .await?;
        assert_eq!(account.id, fx.officer.id);

        let actor = fx.auth.resolve_actor(&token.access_token).await?;
        assert_eq!(actor, fx.officer);

        let refreshed = fx.auth.refresh(&token.refresh_token).await?;
        assert!(fx.auth.resolve_actor(&refreshed.access_token).await.is_ok());

        let err = fx.auth.refresh(&token.access_token).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::Authentication(_))));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_inactive_accounts_are_rejected() -> Result<()> {
        let fx = Fixture::new().await;
        let err = fx
            .auth
            .login(&LoginCredentials {
                email: fx.officer.email.clone(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::Authentication(_))));

        let (_, token) = fx
            .auth
            .login(&LoginCredentials {
                email: fx.officer.email.clone(),
                password: Fixture::PASSWORD.to_string(),
            })
            .await?;
        fx.auth.set_active(&fx.admin, &fx.officer.id, false).await?;

        assert!(fx.auth.resolve_actor(&token.access_token).await.is_err());
        let err = fx
            .auth
            .login(&LoginCredentials {
                email: fx.officer.email.clone(),
                password: Fixture::PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::Authentication(_))));
        Ok(())
    }

    #[tokio::test]
    async fn profile_update_keeps_privileged_fields() -> Result<()> {
        let fx = Fixture::new().await;
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"first_name": "Agus", "phone_number": "0812345", "role": "admin", "active": false}"#,
        )?;
        let account = fx.auth.update_profile(&fx.officer, &update).await?;
        assert_eq!(account.first_name, "Agus");
        assert_eq!(account.phone_number.as_deref(), Some("0812345"));
        assert_eq!(account.role, Role::Officer);
        assert!(account.active);

        let too_long = ProfileUpdate {
            phone_number: Some("0".repeat(16)),
            ..ProfileUpdate::default()
        };
        let err = fx.auth.update_profile(&fx.officer, &too_long).await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("phone_number"));
        Ok(())
    }

    #[tokio::test]
    async fn change_password_checks_the_current_one() -> Result<()> {
        let fx = Fixture::new().await;
        let err = fx
            .auth
            .change_password(&fx.officer, "not-it", "brand-new-pass")
            .await
            .unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("current_password"));

        fx.auth
            .change_password(&fx.officer, Fixture::PASSWORD, "brand-new-pass")
            .await?;
        let login = fx
            .auth
            .login(&LoginCredentials {
                email: fx.officer.email.clone(),
                password: "brand-new-pass".to_string(),
            })
            .await;
        assert!(login.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn account_management_is_admin_only() -> Result<()> {
        let fx = Fixture::new().await;

        for actor in [&fx.officer, &fx.unassigned] {
            let err = fx.auth.update_role(actor, &fx.other_officer.id, "admin").await.unwrap_err();
            assert!(matches!(domain_error(&err), Some(Error::Forbidden(_))));
            assert!(fx.auth.list_officers(actor).await.is_err());
        }
        let untouched = fx.auth.get_officer(&fx.admin, &fx.other_officer.id).await?;
        assert_eq!(untouched.role, Role::Officer);

        let err = fx.auth.update_role(&fx.admin, &fx.other_officer.id, "captain").await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("role"));

        let promoted = fx.auth.update_role(&fx.admin, &fx.unassigned.id, "petugas").await?;
        assert_eq!(promoted.role, Role::Officer);

        let officers = fx.auth.list_officers(&fx.admin).await?;
        let emails: Vec<&str> = officers.iter().map(|o| o.email.as_str()).collect();
        let mut sorted = emails.clone();
        sorted.sort();
        assert_eq!(emails, sorted);
        assert_eq!(officers.len(), 3);

        let err = fx.auth.get_officer(&fx.admin, &fx.admin.id).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn admin_creates_accounts_and_resets_passwords() -> Result<()> {
        let fx = Fixture::new().await;
        let request = NewAccountRequest {
            account: register_request("second.admin@patrol.id"),
            role: "admin".to_string(),
        };
        let created = fx.auth.create_account(&fx.admin, &request).await?;
        assert_eq!(created.role, Role::Admin);

        let err = fx.auth.create_account(&fx.officer, &request).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::Forbidden(_))));

        let generated = fx.auth.reset_password(&fx.admin, &fx.officer.id).await?;
        let login = fx
            .auth
            .login(&LoginCredentials {
                email: fx.officer.email.clone(),
                password: generated,
            })
            .await;
        assert!(login.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn bootstrap_admin_only_when_none_exists() -> Result<()> {
        let fx = Fixture::new().await;
        let created = fx
            .auth
            .ensure_bootstrap_admin("root@patrol.id", "bootstrap-pass")
            .await?;
        assert!(created.is_none());

        let empty = AuthService::new(Stores::memory().accounts, &testing::security_config());
        let admin = empty
            .ensure_bootstrap_admin("root@patrol.id", "bootstrap-pass")
            .await?
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(empty
            .ensure_bootstrap_admin("root@patrol.id", "bootstrap-pass")
            .await?
            .is_none());
        Ok(())
    }
}
