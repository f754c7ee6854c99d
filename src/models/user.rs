use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classifies the scope a token was issued for.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessTag {
    /// A login session.
    Auth,
}

/// One entry of a user's token list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub access: AccessTag,
    pub token: String,
}

/// A user document as held by the credential store.
///
/// `password_hash` is a bcrypt hash, never the plaintext password. `tokens` is kept
/// in issue order.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub tokens: Vec<AuthToken>,
}

/// Fields required to insert a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// The public view of a user returned by the API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

impl User {
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash: input.password_hash,
            tokens: Vec::new(),
        }
    }

    /// Returns true if `token` is listed for the given access tag.
    pub fn holds_token(&self, access: AccessTag, token: &str) -> bool {
        self.tokens
            .iter()
            .any(|t| t.access == access && constant_time_eq(t.token.as_bytes(), token.as_bytes()))
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
