use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{AccessTag, AuthToken, User};
use crate::store::{StoreError, UserStore};

/// Represents the claims encoded within an issued token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub sub: Uuid,
    /// Scope of the token.
    pub access: AccessTag,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Random nonce so two tokens issued in the same second still differ.
    pub jti: Uuid,
}

/// Signing material derived from the process-wide secret.
///
/// Built once at startup and handed to `issue_token`/`validate_token` through
/// application state.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        // Tokens carry no expiry; revocation happens through the user's token list.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("TokenKeys(..)")
    }
}

/// Errors raised while issuing or validating a token.
#[derive(Debug)]
pub enum AuthError {
    /// Bad signature, undecodable payload, unknown user, or a token no longer
    /// listed on the user.
    InvalidToken,
    /// The store failed while looking up the token's owner.
    Storage(StoreError),
    /// Encoding the claims failed.
    Signing(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "invalid token"),
            AuthError::Storage(e) => write!(f, "{}", e),
            AuthError::Signing(msg) => write!(f, "failed to sign token: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> AuthError {
        AuthError::Storage(error)
    }
}

/// A caller whose token passed validation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub access: AccessTag,
    /// The exact token string presented, needed to revoke it on logout.
    pub token: String,
}

/// Signs a fresh token for `user_id` without persisting it.
pub fn sign_token(keys: &TokenKeys, user_id: Uuid, access: AccessTag) -> Result<String, AuthError> {
    let claims = Claims {
        sub: user_id,
        access,
        iat: Utc::now().timestamp(),
        jti: Uuid::new_v4(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verifies the signature and decodes the claims. Any failure is `InvalidToken`.
pub fn decode_claims(keys: &TokenKeys, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &keys.decoding, &keys.validation)
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("rejected token: {}", e);
            AuthError::InvalidToken
        })
}

/// Issues a token for `user`, appends it to the user's token list and persists the user.
///
/// The write is a read-modify-write of the whole user document, so two concurrent
/// issues for the same user may lose one of the tokens.
pub async fn issue_token(
    keys: &TokenKeys,
    store: &dyn UserStore,
    user: &mut User,
    access: AccessTag,
) -> Result<String, AuthError> {
    let token = sign_token(keys, user.id, access)?;
    user.tokens.push(AuthToken {
        access,
        token: token.clone(),
    });
    store.save_user(user).await?;
    Ok(token)
}

/// Validates a presented token.
///
/// Succeeds only if the signature verifies, the owner still exists, the token is
/// still listed on the owner's record, and it was issued for `AccessTag::Auth`.
pub async fn validate_token(
    keys: &TokenKeys,
    store: &dyn UserStore,
    token: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let claims = decode_claims(keys, token)?;

    let user = match store.find_user_by_id(claims.sub).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
        Err(e) => return Err(AuthError::Storage(e)),
    };

    if claims.access != AccessTag::Auth || !user.holds_token(claims.access, token) {
        return Err(AuthError::InvalidToken);
    }

    Ok(AuthenticatedUser {
        user,
        access: claims.access,
        token: token.to_string(),
    })
}

/// Removes `token` from the user's token list. Revoking twice is harmless.
pub async fn revoke_token(
    store: &dyn UserStore,
    user_id: Uuid,
    token: &str,
) -> Result<(), StoreError> {
    store.remove_token(user_id, token).await
}
