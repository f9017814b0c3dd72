//! Session endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{HeaderMap, SET_COOKIE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use super::{Ack, ApiResult};
use crate::api::extract::{session_tokens, ApiJson, CurrentUser, MaybeUser};
use crate::api::state::AppState;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::model::{Preferences, User};

/// The signed-in user, or `null`.
pub(super) async fn me(MaybeUser(user): MaybeUser) -> Json<Option<User>> {
    Json(user)
}

/// Revoke every session the request carries and clear the cookie.
pub(super) async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let auth = &state.config.auth;
    let tokens = session_tokens(&headers, &auth.cookie_name);
    if !tokens.is_empty() {
        let storage = state.storage()?;
        for token in &tokens {
            if storage.delete_session(token)? {
                info!("Session revoked on logout");
            }
        }
    }

    let cookie = HeaderValue::from_str(&clear_cookie(auth))
        .map_err(|_| Error::internal("cookie name is not a valid header value"))?;
    Ok(([(SET_COOKIE, cookie)], Ack::ok()).into_response())
}

/// `Set-Cookie` value that expires the session cookie.
fn clear_cookie(auth: &AuthConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        auth.cookie_name
    );
    if auth.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Change display preferences. Omitted fields are left unchanged.
pub(super) async fn update_preferences(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(prefs): ApiJson<Preferences>,
) -> ApiResult<Ack> {
    if !prefs.is_empty() {
        state.storage()?.update_preferences(user.id, &prefs)?;
    }
    Ok(Ack::ok())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::api::routes::test_support::TestApp;
    use crate::model::FontSize;

    #[test]
    fn test_clear_cookie() {
        let mut auth = AuthConfig::default();
        assert_eq!(
            clear_cookie(&auth),
            "app_session_id=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax; Secure"
        );
        auth.secure_cookies = false;
        assert!(!clear_cookie(&auth).contains("Secure"));
    }

    #[tokio::test]
    async fn test_me_anonymous_is_null() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/auth/me", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_me_with_bearer_token() {
        let app = TestApp::new();
        let token = app.login("alice", None);

        let (status, body) = app.get("/api/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["openId"], "alice");
        assert_eq!(body["fontSize"], "large");
        assert_eq!(body["role"], "user");
    }

    #[tokio::test]
    async fn test_me_with_cookie() {
        let app = TestApp::new();
        let token = app.login("bob", None);

        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, format!("app_session_id={token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["openId"], "bob");
    }

    #[tokio::test]
    async fn test_stale_cookie_falls_back_to_bearer() {
        let app = TestApp::new();
        let token = app.login("dave", None);

        let request = Request::builder()
            .uri("/api/auth/preferences")
            .method(Method::PATCH)
            .header(header::COOKIE, "app_session_id=expired-or-revoked")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "highContrast": false }).to_string()))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, "app_session_id=expired-or-revoked")
            .header(header::AUTHORIZATION, "Bearer also-unknown")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&bytes[..], b"null");
    }

    #[tokio::test]
    async fn test_logout_revokes_session_and_clears_cookie() {
        let app = TestApp::new();
        let token = app.login("carol", None);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("app_session_id=;"));
        assert!(cookie.contains("Max-Age=0"));

        let (_, body) = app.get("/api/auth/me", Some(&token)).await;
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_logout_without_session_still_succeeds() {
        let app = TestApp::new();
        let (status, body) = app.post("/api/auth/logout", None, json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_update_preferences() {
        let app = TestApp::new();
        let token = app.login("dave", None);

        let (status, body) = app
            .send(
                Method::PATCH,
                "/api/auth/preferences",
                Some(&token),
                Some(json!({"fontSize": "extra-large", "voiceNavigation": false})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let user = app
            .state
            .storage()
            .unwrap()
            .user_by_open_id("dave")
            .unwrap()
            .unwrap();
        assert_eq!(user.font_size, FontSize::ExtraLarge);
        assert!(!user.voice_navigation);
        assert!(user.high_contrast);
    }

    #[tokio::test]
    async fn test_update_preferences_requires_session() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                Method::PATCH,
                "/api/auth/preferences",
                None,
                Some(json!({"highContrast": false})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn test_update_preferences_rejects_unknown_font_size() {
        let app = TestApp::new();
        let token = app.login("erin", None);
        let (status, body) = app
            .send(
                Method::PATCH,
                "/api/auth/preferences",
                Some(&token),
                Some(json!({"fontSize": "huge"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }
}
