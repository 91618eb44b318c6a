//! OTP-based authentication.
//!
//! Login is phone-number-first: requesting an OTP creates the user row on
//! first contact, verification rotates the opaque bearer token. Codes are
//! hashed at rest and expire after the configured window.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use makaan_common::{AppError, AppResult, IdGenerator};
use makaan_db::{entities::user, repositories::UserRepository};
use rand::Rng;
use sea_orm::Set;

use super::sms::SmsSender;

/// Result of a successful OTP verification.
pub struct LoginOutcome {
    pub user: user::Model,
    pub token: String,
    /// Whether the profile still needs its basic fields filled in.
    pub profile_complete: bool,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    sms: Arc<dyn SmsSender>,
    otp_ttl: chrono::Duration,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(user_repo: UserRepository, sms: Arc<dyn SmsSender>, otp_ttl_secs: i64) -> Self {
        Self {
            user_repo,
            sms,
            otp_ttl: chrono::Duration::seconds(otp_ttl_secs),
            id_gen: IdGenerator::new(),
        }
    }

    /// Issue an OTP to a phone number, creating the user on first contact.
    pub async fn request_otp(&self, phone_number: &str) -> AppResult<()> {
        let phone_number = normalize_phone(phone_number)?;

        let code = generate_code();
        let otp_hash = hash_secret(&code)?;
        let expires_at = chrono::Utc::now() + self.otp_ttl;

        match self.user_repo.find_by_phone(&phone_number).await? {
            Some(existing) => {
                let mut model: user::ActiveModel = existing.into();
                model.otp_hash = Set(Some(otp_hash));
                model.otp_expires_at = Set(Some(expires_at.into()));
                self.user_repo.update(model).await?;
            }
            None => {
                // First contact: the account is created by the login itself.
                let model = user::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    phone_number: Set(phone_number.clone()),
                    otp_hash: Set(Some(otp_hash)),
                    otp_expires_at: Set(Some(expires_at.into())),
                    created_at: Set(chrono::Utc::now().into()),
                    ..Default::default()
                };
                self.user_repo.create(model).await?;
            }
        }

        self.sms
            .send(
                &phone_number,
                &format!("Your Makaan login code is {code}. It expires in 5 minutes."),
            )
            .await?;

        Ok(())
    }

    /// Verify an OTP and issue a fresh bearer token.
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> AppResult<LoginOutcome> {
        let phone_number = normalize_phone(phone_number)?;

        let user = self
            .user_repo
            .find_by_phone(&phone_number)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let Some(ref otp_hash) = user.otp_hash else {
            return Err(AppError::Unauthorized);
        };
        let Some(expires_at) = user.otp_expires_at else {
            return Err(AppError::Unauthorized);
        };
        if chrono::Utc::now() > expires_at {
            return Err(AppError::Unauthorized);
        }
        if !verify_secret(code, otp_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let profile_complete = user.fname.is_some() && user.place.is_some();

        let mut model: user::ActiveModel = user.into();
        model.token = Set(Some(token.clone()));
        model.otp_hash = Set(None);
        model.otp_expires_at = Set(None);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let user = self.user_repo.update(model).await?;

        Ok(LoginOutcome {
            user,
            token,
            profile_complete,
        })
    }

    /// Invalidate the caller's bearer token.
    pub async fn logout(&self, user: user::Model) -> AppResult<()> {
        let mut model: user::ActiveModel = user.into();
        model.token = Set(None);
        self.user_repo.update(model).await?;
        Ok(())
    }
}

/// Six-digit numeric code.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// Accepts 10-15 digits with an optional leading `+`.
fn normalize_phone(phone: &str) -> AppResult<String> {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("Invalid phone number".to_string()));
    }
    Ok(digits.to_string())
}

fn hash_secret(secret: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(secret.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash secret: {e}")))
}

fn verify_secret(secret: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_normalize_phone_strips_plus() {
        assert_eq!(normalize_phone("+919876543210").unwrap(), "919876543210");
    }

    #[test]
    fn test_normalize_phone_rejects_short_numbers() {
        assert!(normalize_phone("12345").is_err());
    }

    #[test]
    fn test_normalize_phone_rejects_letters() {
        assert!(normalize_phone("98765abc43").is_err());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_secret("483920").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("483920", &hash).unwrap());
        assert!(!verify_secret("000000", &hash).unwrap());
    }
}
