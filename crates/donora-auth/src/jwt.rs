use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::profile::Profile;
use crate::types::Actor;

/// Session token claims. The role and permission names are a login-time copy
/// for the client; the server reads the live profile on every request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthClaims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

impl AuthClaims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.role.clone(), self.permissions.iter().cloned())
    }
}

pub fn create_jwt(
    user_id: &str,
    username: &str,
    profile: &Profile,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = AuthClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: profile.role.clone(),
        permissions: profile.permissions.clone(),
        exp: now + ttl_secs as usize,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode error: {e}")))
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<AuthClaims, AuthError> {
    let data = decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        AuthError::Unauthorized
    })?;
    Ok(data.claims)
}
