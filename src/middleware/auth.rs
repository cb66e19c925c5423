//! HTTP basic authentication for the write endpoints.
//!
//! Handlers opt in by taking an [`Admin`] argument.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried the configured credentials.
#[derive(Debug, Clone, Copy)]
pub struct Admin;

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.config().auth;

        match basic_credentials(&parts.headers) {
            Some((user, password)) if credentials_match(auth, &user, &password) => Ok(Admin),
            Some((user, _)) => {
                warn!(%user, path = %parts.uri.path(), "rejected credentials");
                Err(AppError::Unauthorized {
                    realm: auth.realm.clone(),
                })
            }
            None => Err(AppError::Unauthorized {
                realm: auth.realm.clone(),
            }),
        }
    }
}

/// User and password of a `Basic` authorization header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;

    Some((user.to_string(), password.to_string()))
}

/// Constant-time comparison against the configured credentials. An empty
/// configured password matches nothing.
pub fn credentials_match(auth: &AuthConfig, user: &str, password: &str) -> bool {
    if auth.password.is_empty() {
        return false;
    }

    let user_ok = user.as_bytes().ct_eq(auth.user.as_bytes());
    let password_ok = password.as_bytes().ct_eq(auth.password.as_bytes());

    bool::from(user_ok & password_ok)
}
