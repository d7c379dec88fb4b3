//! Signed bearer tokens identifying a user.
//!
//! Tokens are HS256 JSON Web Tokens whose subject is the user's e-mail
//! address. Clients present them as a cookie value of the form
//! `Bearer <token>`; the scheme is matched case-insensitively.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{StoreError, User, UserId, UserIdError, UserStore};

/// Lifetime of a token when the caller does not choose one.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

const BEARER_SCHEME: &str = "bearer";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user's e-mail address.
    pub sub: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// HMAC keys derived from the shared session secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    /// Derive signing and verification keys from `secret`.
    ///
    /// # Errors
    /// Returns [`SessionError::EmptySecret`] for an empty secret.
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

/// Errors raised while issuing tokens.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session secret was empty.
    #[error("session secret must not be empty")]
    EmptySecret,
    /// `now + ttl` does not fit in a timestamp.
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
    /// The token could not be signed.
    #[error("failed to sign session token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Reasons a presented token does not authenticate a user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token was presented.
    #[error("not authenticated: no bearer token supplied")]
    MissingToken,
    /// The value did not use the `Bearer` scheme.
    #[error("not authenticated: expected a Bearer token")]
    InvalidScheme,
    /// The token's expiry lies in the past.
    #[error("not authenticated: token has expired")]
    Expired,
    /// The signature or structure of the token is invalid.
    #[error("not authenticated: invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    /// The token's subject is not an e-mail address.
    #[error("not authenticated: invalid subject: {0}")]
    InvalidSubject(#[source] UserIdError),
    /// The token names a user that is not registered.
    #[error("not authenticated: user {user} is not registered")]
    UnknownUser {
        /// Subject of the token.
        user: UserId,
    },
    /// Looking up the user failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sign a token for `user` that expires `ttl` after `now`.
///
/// # Errors
/// Returns [`SessionError::ExpiryOutOfRange`] when the expiry overflows and
/// [`SessionError::Encode`] when signing fails.
pub fn issue_at(
    keys: &SessionKeys,
    user: &UserId,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> Result<String, SessionError> {
    let expires = now
        .checked_add_signed(ttl)
        .ok_or(SessionError::ExpiryOutOfRange)?;
    let claims = Claims {
        sub: user.as_str().to_owned(),
        exp: expires.timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(SessionError::Encode)
}

/// Sign a token for `user` that expires `ttl` from now.
///
/// # Errors
/// See [`issue_at`].
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use platewise_core::{SessionKeys, UserId, authenticate, issue};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let keys = SessionKeys::new("secret")?;
/// let user = UserId::new("ada@example.com")?;
/// let token = issue(&keys, &user, TimeDelta::minutes(15))?;
/// let cookie = format!("Bearer {token}");
/// assert_eq!(authenticate(&keys, Some(&cookie))?, user);
/// # Ok(())
/// # }
/// ```
pub fn issue(keys: &SessionKeys, user: &UserId, ttl: TimeDelta) -> Result<String, SessionError> {
    issue_at(keys, user, ttl, Utc::now())
}

/// Validate a `Bearer <token>` value and return the user it names.
///
/// # Errors
/// Returns an [`AuthError`] describing why the value does not authenticate.
pub fn authenticate(keys: &SessionKeys, cookie: Option<&str>) -> Result<UserId, AuthError> {
    let value = cookie
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingToken)?;
    let (scheme, rest) = value
        .split_once(char::is_whitespace)
        .ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::InvalidScheme);
    }
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(rest.trim_start(), &keys.decoding, &validation).map_err(|err| {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(err),
        }
    })?;
    UserId::new(data.claims.sub).map_err(AuthError::InvalidSubject)
}

/// Authenticate `cookie` and load the registered user it names.
///
/// # Errors
/// Returns [`AuthError::UnknownUser`] for a valid token whose subject is not
/// registered, in addition to the errors of [`authenticate`].
pub fn resolve_user<S>(
    store: &S,
    keys: &SessionKeys,
    cookie: Option<&str>,
) -> Result<User, AuthError>
where
    S: UserStore + ?Sized,
{
    let user = authenticate(keys, cookie)?;
    store
        .find_user(&user)?
        .ok_or(AuthError::UnknownUser { user })
}
