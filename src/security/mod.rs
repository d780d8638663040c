use crate::config::SecurityConfig;
use crate::db::models::account_models::{Account, AuthToken};
use crate::error::Error;
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth;
pub mod password;
pub mod policy;

/// What a token may be used for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    pub email: String,
    /// Role at issue time; requests re-read the account instead of trusting it
    pub role: String,
    pub token_use: TokenUse,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// Get the account ID from the claims
    pub fn account_id(&self) -> Result<Uuid> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|e| Error::Authentication(format!("Invalid account ID in token: {}", e)))?;
        Ok(id)
    }
}

/// Security service for issuing and checking bearer tokens
#[derive(Clone)]
pub struct SecurityService {
    config: SecurityConfig,
}

impl SecurityService {
    /// Create a new security service
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    fn sign(&self, account: &Account, token_use: TokenUse, minutes: u64) -> Result<String> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(minutes as i64);

        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            role: account.role.to_string(),
            token_use,
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Authentication(format!("Failed to generate JWT token: {}", e)))?;

        Ok(token)
    }

    /// Generate an access/refresh token pair for an account
    pub fn generate_token(&self, account: &Account) -> Result<AuthToken> {
        let access_token = self.sign(account, TokenUse::Access, self.config.jwt_expiration_minutes)?;
        let refresh_token = self.sign(
            account,
            TokenUse::Refresh,
            self.config.refresh_expiration_minutes,
        )?;

        Ok(AuthToken {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.jwt_expiration_minutes * 60,
        })
    }

    /// Validate and decode a JWT token issued for `expected` use
    pub fn validate_token(&self, token: &str, expected: TokenUse) -> Result<TokenData<Claims>> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| Error::Authentication(format!("Invalid token: {}", e)))?;

        if token_data.claims.token_use != expected {
            return Err(Error::Authentication("Token cannot be used here".to_string()).into());
        }

        Ok(token_data)
    }
}
