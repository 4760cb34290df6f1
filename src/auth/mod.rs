//! Session handling for the single portfolio owner.

pub mod gate;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use gate::{AuthGate, GateOutcome, GateState, SessionState};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Session has been signed out")]
    Revoked,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    pub uid: String,
    /// Session id, used for sign-out revocation
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: &str, uid: &str, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: email.to_string(),
            uid: uid.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Authenticated caller, passed to protected handlers as a request extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub session_id: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.uid,
            email: claims.sub,
            session_id: claims.jti,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: Identity,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct PasswordResetRequest {
    pub email: String,
    pub token: String,
    pub requested_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError>;

    /// Turn a bearer token back into the identity it was issued for
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Lowercase hex SHA-256, the format `OWNER_PASSWORD_SHA256` is configured in
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// One configured owner account with stateless HS256 sessions.
/// Signed-out session ids are remembered for the life of the process.
pub struct OwnerAuthProvider {
    email: String,
    password_sha256: String,
    uid: String,
    secret: String,
    expiry_hours: u64,
    revoked: RwLock<HashSet<String>>,
    resets: Mutex<Vec<PasswordResetRequest>>,
}

impl OwnerAuthProvider {
    pub fn new(security: &SecurityConfig) -> Self {
        let email = security.owner_email.trim().to_lowercase();
        let uid = format!("{:x}", Sha256::digest(email.as_bytes()))[..16].to_string();

        Self {
            email,
            password_sha256: security.owner_password_sha256.to_lowercase(),
            uid,
            secret: security.jwt_secret.clone(),
            expiry_hours: security.jwt_expiry_hours,
            revoked: RwLock::new(HashSet::new()),
            resets: Mutex::new(Vec::new()),
        }
    }

    /// Password reset requests recorded so far
    pub fn reset_requests(&self) -> Vec<PasswordResetRequest> {
        self.resets.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn issue(&self) -> Result<Session, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let claims = Claims::new(&self.email, &self.uid, self.expiry_hours);
        let expires_in = claims.exp - claims.iat;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        Ok(Session {
            token,
            user: Identity::from(claims),
            expires_in,
        })
    }

    fn is_revoked(&self, session_id: &str) -> bool {
        self.revoked
            .read()
            .map(|revoked| revoked.contains(session_id))
            .unwrap_or(true)
    }
}

#[async_trait]
impl AuthProvider for OwnerAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email_matches = !self.email.is_empty() && email.trim().eq_ignore_ascii_case(&self.email);
        let password_matches =
            !self.password_sha256.is_empty() && password_digest(password) == self.password_sha256;

        if !(email_matches && password_matches) {
            warn!("Rejected sign-in attempt for '{}'", email.trim());
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue()?;
        info!("Owner signed in ({})", session.user.email);
        Ok(session)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        // Unknown addresses get the same answer so the endpoint can't reveal which accounts exist
        if !email.trim().eq_ignore_ascii_case(&self.email) {
            warn!("Password reset requested for unknown address");
            return Ok(());
        }

        let request = PasswordResetRequest {
            email: self.email.clone(),
            token: Uuid::new_v4().simple().to_string(),
            requested_at: Utc::now(),
        };
        info!("Password reset requested for {}", request.email);
        if let Ok(mut resets) = self.resets.lock() {
            resets.push(request);
        }
        Ok(())
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        if let Ok(mut revoked) = self.revoked.write() {
            revoked.insert(identity.session_id.clone());
        }
        info!("Session {} signed out", identity.session_id);
        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if self.is_revoked(&data.claims.jti) {
            return Err(AuthError::Revoked);
        }
        Ok(Identity::from(data.claims))
    }
}
