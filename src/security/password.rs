use crate::config::SecurityConfig;
use crate::error::Error;
use anyhow::Result;
use bcrypt::{hash, verify};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password with bcrypt at the configured cost
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let hashed = hash(password, config.password_hash_cost)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hashed)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let result = verify(password, hash)
        .map_err(|e| Error::Authentication(format!("Failed to verify password: {}", e)))?;

    Ok(result)
}

/// Reject passwords that are blank or too short
pub fn check_strength(field: &str, password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(Error::invalid(field, "Password is required").into());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::invalid(
            field,
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        )
        .into());
    }
    Ok(())
}

/// Generate a random password
pub fn generate_random_password(length: usize) -> String {
    use rand::{thread_rng, Rng};
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#$%^&*";

    let mut rng = thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
