use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri, Query, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::services::auth::AuthService;
use crate::AppState;

/// Where signed-in users land when they hit a public-only page.
pub const AFTER_SIGN_IN_PATH: &str = "/events";

/// Sign-in and sign-up pages. The identity provider hosts the real forms;
/// these only bounce signed-in users and point everyone else at the provider.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sign-in", get(sign_in))
        .route("/sign-in/*rest", get(sign_in))
        .route("/sign-up", get(sign_up))
        .route("/sign-up/*rest", get(sign_up))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AuthPageQuery {
    redirect_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPageResponse {
    pub page: &'static str,
    pub provider_url: String,
    pub redirect_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn sign_in(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<AuthPageQuery>,
) -> Response {
    auth_page(
        "sign-in",
        &state.config.auth.sign_in_url,
        user_id,
        query.redirect_url,
    )
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<AuthPageQuery>,
) -> Response {
    auth_page(
        "sign-up",
        &state.config.auth.sign_up_url,
        user_id,
        query.redirect_url,
    )
}

fn auth_page(
    page: &'static str,
    provider_url: &str,
    user_id: Option<String>,
    redirect_url: Option<String>,
) -> Response {
    if user_id.is_some() {
        return Redirect::to(AFTER_SIGN_IN_PATH).into_response();
    }

    let redirect_url = redirect_url
        .filter(|r| is_safe_redirect(r))
        .unwrap_or_else(|| AFTER_SIGN_IN_PATH.to_string());

    Json(AuthPageResponse {
        page,
        provider_url: provider_url.to_string(),
        redirect_url,
    })
    .into_response()
}

// ============================================================================
// Helper functions
// ============================================================================

/// Only same-site paths: `/events` yes, `//evil.example` and absolute URLs no.
pub fn is_safe_redirect(redirect: &str) -> bool {
    redirect.starts_with('/') && !redirect.starts_with("//") && !redirect.contains('\\')
}

/// Sign-in location that returns the user to `path` afterwards.
pub fn sign_in_location(state: &AppState, path: &str) -> String {
    format!(
        "{}?redirect_url={}",
        state.config.auth.sign_in_url,
        urlencoding::encode(path)
    )
}

// ============================================================================
// Extractors
// ============================================================================

/// Signed-in user id if the request carries a valid session, `None` otherwise.
/// Never rejects, so handlers decide what being signed out means.
pub struct CurrentUser(pub Option<String>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = AuthService::current_user_id(&state.config.auth.jwt_secret, &parts.headers);
        if let Some(ref id) = user_id {
            tracing::debug!("Authenticated user: {}", id);
        }
        Ok(CurrentUser(user_id))
    }
}

/// Signed-in user id for private pages. Signed-out visitors are redirected to
/// the sign-in page with a way back.
pub struct SignedIn(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SignedIn {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match AuthService::current_user_id(&state.config.auth.jwt_secret, &parts.headers) {
            Some(user_id) => Ok(SignedIn(user_id)),
            None => {
                // Nested routers see a stripped URI; send users back to the full path.
                let uri = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map(|original| &original.0)
                    .unwrap_or(&parts.uri);
                let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
                tracing::debug!("Redirecting signed-out request for {} to sign-in", path);
                Err(Redirect::to(&sign_in_location(state, path)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get, get_as, test_app};
    use axum::http::StatusCode;

    #[test]
    fn safe_redirects() {
        assert!(is_safe_redirect("/events"));
        assert!(is_safe_redirect("/events/new?x=1"));
        assert!(!is_safe_redirect("//evil.example"));
        assert!(!is_safe_redirect("https://evil.example"));
        assert!(!is_safe_redirect("/\\evil.example"));
        assert!(!is_safe_redirect("events"));
    }

    #[tokio::test]
    async fn signed_in_users_skip_auth_pages() {
        let (app, _pool) = test_app().await;

        let res = get_as(&app, "/sign-in", "user_1").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert_eq!(res.location(), Some("/events"));

        let res = get_as(&app, "/sign-up/verify", "user_1").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn signed_out_users_get_provider_page() {
        let (app, _pool) = test_app().await;

        let res = get(&app, "/sign-in?redirect_url=%2Fschedule").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["page"], "sign-in");
        assert_eq!(res.body["redirectUrl"], "/schedule");

        let res = get(&app, "/sign-up?redirect_url=https%3A%2F%2Fevil.example").await;
        assert_eq!(res.body["redirectUrl"], "/events");
    }
}
