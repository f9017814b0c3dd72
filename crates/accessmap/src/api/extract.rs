//! Request extractors.
//!
//! `CurrentUser` and `MaybeUser` resolve the session token carried by the
//! session cookie or an `Authorization: Bearer` header. The `Api*` wrappers
//! replace axum's plain-text rejections with [`Error`] so malformed input is
//! answered in the same JSON shape as every other failure.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::{HeaderMap, AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::state::AppState;
use crate::error::Error;
use crate::model::User;

/// Read a bearer token from the `Authorization` header.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let auth_lower = auth.to_ascii_lowercase();
    if auth_lower.starts_with("bearer ") {
        Some(auth[7..].trim().to_string()).filter(|token| !token.is_empty())
    } else {
        None
    }
}

/// Read the named cookie from every `Cookie` header.
pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Session tokens carried by a request, cookie before bearer.
pub(crate) fn session_tokens(headers: &HeaderMap, cookie_name: &str) -> Vec<String> {
    let mut tokens: Vec<String> = extract_cookie(headers, cookie_name).into_iter().collect();
    if let Some(bearer) = extract_bearer_token(headers) {
        if !tokens.contains(&bearer) {
            tokens.push(bearer);
        }
    }
    tokens
}

/// The first carried token that names a live session wins.
fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, Error> {
    let tokens = session_tokens(&parts.headers, &state.config.auth.cookie_name);
    if tokens.is_empty() {
        return Ok(None);
    }
    let storage = state.storage()?;
    for token in &tokens {
        if let Some(user) = storage.user_for_session(token)? {
            return Ok(Some(user));
        }
        debug!("Ignoring unknown or expired session token");
    }
    Ok(None)
}

/// The signed-in user. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)?
            .map(Self)
            .ok_or(Error::Unauthenticated)
    }
}

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state)?))
    }
}

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::validation("body", rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::validation("query", rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::validation("path", rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; app_session_id=tok"));
        assert_eq!(
            extract_cookie(&headers, "app_session_id").as_deref(),
            Some("tok")
        );
        assert!(extract_cookie(&headers, "session").is_none());

        headers.append(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(extract_cookie(&headers, "other").as_deref(), Some("1"));
    }

    #[test]
    fn test_session_tokens_cookie_first() {
        let mut headers = HeaderMap::new();
        assert!(session_tokens(&headers, "app_session_id").is_empty());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_tokens(&headers, "app_session_id"), ["from-header"]);

        headers.insert(COOKIE, HeaderValue::from_static("app_session_id=from-cookie"));
        assert_eq!(
            session_tokens(&headers, "app_session_id"),
            ["from-cookie", "from-header"]
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-cookie"));
        assert_eq!(session_tokens(&headers, "app_session_id"), ["from-cookie"]);
    }
}
