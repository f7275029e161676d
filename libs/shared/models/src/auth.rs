use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Doctor => write!(f, "DOCTOR"),
            Role::Patient => write!(f, "PATIENT"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

/// The authenticated principal attached to a request by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain capability predicate: an empty required set means any
/// authenticated principal passes.
pub fn role_allowed(role: Role, required: &[Role]) -> bool {
    required.is_empty() || required.contains(&role)
}

/// Evaluate the capability check for a handler before doing any work.
pub fn require_role(user: &AuthUser, required: &[Role]) -> Result<(), AppError> {
    if role_allowed(user.role, required) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role {} is not allowed to perform this operation",
            user.role
        )))
    }
}
