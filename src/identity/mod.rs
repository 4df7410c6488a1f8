use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::{GameError, GameResult};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated session. The token is opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Uuid,
    pub account_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn open(account_id: Uuid, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            token: Uuid::new_v4(),
            account_id,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Account sign-up, sign-in and session lookup.
pub trait IdentityProvider {
    /// Registers a new account and signs it in.
    fn sign_up(&mut self, email: &str, password: &str) -> GameResult<Session>;

    fn sign_in(&mut self, email: &str, password: &str) -> GameResult<Session>;

    /// The session for `token`, if it exists and has not expired.
    fn session(&self, token: Uuid) -> Option<Session>;

    fn current_account(&self, token: Uuid) -> Option<Account>;

    /// Unknown tokens are ignored.
    fn sign_out(&mut self, token: Uuid);
}

/// Lower-cases and trims an email, rejecting anything without a local part
/// and a domain.
pub fn normalize_email(email: &str) -> GameResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(GameError::Validation(format!(
            "'{}' is not a valid email address",
            email
        ))),
    }
}

/// Masks an email for log lines: `jane@example.com` becomes
/// `j***@example.com`. Input without a domain is masked entirely.
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

pub fn check_password(password: &str) -> GameResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(GameError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
