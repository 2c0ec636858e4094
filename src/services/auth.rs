//! One-time code login and bearer sessions.
//!
//! Codes are kept only as SHA-256 digests keyed by email. A code is good for
//! one successful verification, a few wrong guesses, and `otp_ttl` of wall
//! time, whichever runs out first.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::Principal;
use crate::services::notification::{otp_email, NotificationError, NotificationSender};

const MAX_ATTEMPTS: u8 = 5;
const ADMIN_ID: &str = "admin";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired OTP")]
    InvalidCode,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing or invalid session token")]
    Unauthenticated,
    #[error("Admin access required")]
    Forbidden,
    #[error("Failed to send OTP email")]
    Delivery(#[from] NotificationError),
}

/// Returned to the caller of [`AuthService::request_code`]. The code itself is
/// only exposed over HTTP when the deployment opts in.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

#[derive(Debug)]
struct PendingCode {
    digest: String,
    expires_at: DateTime<Utc>,
    attempts: u8,
}

pub struct AuthService {
    notifier: Arc<dyn NotificationSender>,
    brand: String,
    otp_ttl: Duration,
    admin_username: String,
    admin_password: String,
    pending: Mutex<HashMap<String, PendingCode>>,
    users: RwLock<HashMap<String, Principal>>,
    sessions: RwLock<HashMap<String, Principal>>,
}

impl AuthService {
    pub fn new(config: &AuthConfig, brand: impl Into<String>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            notifier,
            brand: brand.into(),
            otp_ttl: Duration::minutes(config.otp_ttl_minutes),
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
            pending: Mutex::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a fresh code for `email` and mails it. Any earlier code for the
    /// same address is replaced, and expired codes for every address are swept.
    pub async fn request_code(&self, email: &str) -> Result<IssuedCode, AuthError> {
        let email = normalize(email);
        let code = generate_code();
        let digest = digest(&email, &code);
        let now = Utc::now();
        let expires_at = now + self.otp_ttl;

        {
            let mut pending = self.pending.lock().await;
            let before = pending.len();
            pending.retain(|_, p| p.expires_at > now);
            let swept = before - pending.len();
            if swept > 0 {
                debug!("Swept {} expired one-time codes", swept);
            }
            pending.insert(
                email.clone(),
                PendingCode {
                    digest: digest.clone(),
                    expires_at,
                    attempts: 0,
                },
            );
        }

        let (subject, body) = otp_email(&self.brand, &code, self.otp_ttl.num_minutes());
        if let Err(e) = self.notifier.send(&email, &subject, &body).await {
            warn!("Could not deliver one-time code to {}: {}", email, e);
            let mut pending = self.pending.lock().await;
            if pending.get(&email).is_some_and(|p| p.digest == digest) {
                pending.remove(&email);
            }
            return Err(e.into());
        }

        info!("Issued one-time code for {}", email);
        Ok(IssuedCode { code, expires_at })
    }

    /// Consumes the pending code for `email` and opens a session.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        let email = normalize(email);
        {
            let mut pending = self.pending.lock().await;
            let entry = pending.get_mut(&email).ok_or(AuthError::InvalidCode)?;

            if Utc::now() >= entry.expires_at {
                pending.remove(&email);
                debug!("One-time code for {} expired", email);
                return Err(AuthError::InvalidCode);
            }

            if entry.digest != digest(&email, code.trim()) {
                entry.attempts += 1;
                if entry.attempts >= MAX_ATTEMPTS {
                    pending.remove(&email);
                    warn!("Too many wrong codes for {}, code discarded", email);
                }
                return Err(AuthError::InvalidCode);
            }

            pending.remove(&email);
        }

        let principal = self.principal_for(&email).await;
        let session = self.open_session(principal).await;
        info!("User {} logged in", session.principal.id);
        Ok(session)
    }

    pub async fn admin_login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if username != self.admin_username || password != self.admin_password {
            warn!("Rejected admin login for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let principal = Principal {
            id: ADMIN_ID.to_string(),
            email: username.to_string(),
            is_admin: true,
        };
        Ok(self.open_session(principal).await)
    }

    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }

    /// Whether the principal still holds at least one live token.
    pub async fn is_signed_in(&self, principal_id: &str) -> bool {
        self.sessions
            .read()
            .await
            .values()
            .any(|principal| principal.id == principal_id)
    }

    /// Drops the session. Returns whether the token was live.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(principal) = &removed {
            info!("User {} logged out", principal.id);
        }
        removed.is_some()
    }

    async fn principal_for(&self, email: &str) -> Principal {
        if let Some(existing) = self.users.read().await.get(email) {
            return existing.clone();
        }
        self.users
            .write()
            .await
            .entry(email.to_string())
            .or_insert_with(|| Principal::user(new_user_id(), email))
            .clone()
    }

    async fn open_session(&self, principal: Principal) -> Session {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(token.clone(), principal.clone());
        Session { token, principal }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

fn digest(email: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn new_user_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("user-{}", &raw[..9])
}
