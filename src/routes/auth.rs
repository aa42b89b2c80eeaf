//! Auth routes — password login against the backend, logout, session cookies.

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use uuid::Uuid;

use crate::backend::BackendError;
use crate::models::auth::LoginRequest;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";
pub const VISITOR_COOKIE: &str = "visitor_id";

const SESSION_HOURS: i64 = 24;
const REMEMBER_ME_DAYS: i64 = 30;
const VISITOR_DAYS: i64 = 365;

// =============================================================================
// COOKIES
// =============================================================================

/// Session cookie: 24 hours, or 30 days with "remember me".
pub(crate) fn session_cookie(token: String, remember_me: bool, secure: bool) -> Cookie<'static> {
    let max_age = if remember_me { Duration::days(REMEMBER_ME_DAYS) } else { Duration::hours(SESSION_HOURS) };
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Visitor id from its cookie, if the request carries a valid one.
pub(crate) fn known_visitor(jar: &CookieJar) -> Option<Uuid> {
    jar.get(VISITOR_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Resolve the visitor id from its cookie, minting one on first contact.
pub(crate) fn visitor_id(jar: CookieJar, secure: bool) -> (CookieJar, Uuid) {
    if let Some(id) = known_visitor(&jar) {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((VISITOR_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(VISITOR_DAYS));
    (jar.add(cookie), id)
}

// =============================================================================
// SESSION EXTRACTORS
// =============================================================================

/// Bearer token from the `Authorization` header, else the `token` cookie.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(TOKEN_COOKIE)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// Session token required by the handler. Rejects with 401.
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_parts(parts).map(Self).ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "success": false, "error": "Authentication required" })),
            )
        })
    }
}

/// Session token when present; anonymous visitors get `None`.
pub struct MaybeSessionToken(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeSessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(token_from_parts(parts)))
    }
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("invalid login form")]
    Invalid(BTreeMap<&'static str, &'static str>),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("login service unavailable")]
    Unavailable(#[source] BackendError),
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return None;
    }
    Some(normalized)
}

/// Check the form locally; the backend is only called for a clean form.
pub(crate) fn validate_login(form: &LoginForm) -> Result<LoginRequest, LoginError> {
    let mut fields = BTreeMap::new();
    let email = normalize_email(&form.email);
    if email.is_none() {
        fields.insert("email", "Enter a valid email address");
    }
    if form.password.is_empty() {
        fields.insert("password", "Password is required");
    }

    match email {
        Some(email) if fields.is_empty() => Ok(LoginRequest { email, password: form.password.clone() }),
        _ => Err(LoginError::Invalid(fields)),
    }
}

pub(crate) fn login_error_response(err: &LoginError) -> Response {
    match err {
        LoginError::Invalid(fields) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "success": false, "error": "Validation failed", "fields": fields })),
        )
            .into_response(),
        LoginError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
        LoginError::Unavailable(_) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "success": false, "error": "Login is temporarily unavailable" })),
        )
            .into_response(),
    }
}

/// `POST /api/auth/login` — validate, log in against the backend, set cookie.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(form): Json<LoginForm>) -> Response {
    let request = match validate_login(&form) {
        Ok(request) => request,
        Err(e) => return login_error_response(&e),
    };

    let response = match state.auth.login(&request).await {
        Ok(response) => response,
        Err(e) => {
            let err = match e.status() {
                Some(400 | 401) => LoginError::InvalidCredentials,
                _ => {
                    tracing::error!(error = %e, "backend login failed");
                    LoginError::Unavailable(e)
                }
            };
            return login_error_response(&err);
        }
    };

    tracing::info!(email = %request.email, remember_me = form.remember_me, "login succeeded");
    let cookie = session_cookie(response.token.clone(), form.remember_me, state.config.cookie_secure);
    let body = serde_json::json!({
        "success": true,
        "token": response.token,
        "user": response.user,
    });
    (jar.add(cookie), Json(body)).into_response()
}

/// `POST /api/auth/logout` — clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let jar = CookieJar::new().add(expired_cookie(TOKEN_COOKIE, state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
