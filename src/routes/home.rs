use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::routes::auth::{CurrentUser, AFTER_SIGN_IN_PATH};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub title: &'static str,
    pub sign_in_url: String,
    pub sign_up_url: String,
}

/// Landing page. Signed-in users go straight to their events.
async fn home(State(state): State<Arc<AppState>>, CurrentUser(user_id): CurrentUser) -> Response {
    if user_id.is_some() {
        return Redirect::to(AFTER_SIGN_IN_PATH).into_response();
    }

    Json(HomeResponse {
        title: "Welcome to Calendarly",
        sign_in_url: state.config.auth.sign_in_url.clone(),
        sign_up_url: state.config.auth.sign_up_url.clone(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, get_as, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn home_redirects_signed_in_users() {
        let (app, _pool) = test_app().await;

        let res = get_as(&app, "/", "user_1").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert_eq!(res.location(), Some("/events"));

        let res = get(&app, "/").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["title"], "Welcome to Calendarly");
        assert_eq!(res.body["signInUrl"], "/sign-in");
    }
}
