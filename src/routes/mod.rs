use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, response::IntoResponse, routing::get, Router};
use http::{HeaderValue, StatusCode};
use tower::ServiceBuilder;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware;
use crate::AppState;

pub mod auth;
pub mod booking;
pub mod events;
pub mod health;
pub mod home;
pub mod schedule;

/// Build the full application router.
///
/// Must be called inside a tokio runtime: the booking rate limiter gets a
/// background task that prunes its per-IP state.
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let config = &state.config;

    // Public booking pages are the only unauthenticated data reads, so they
    // get a per-IP limiter. The error handler mirrors `AppError::RateLimited`.
    let period_ms = (1000 / config.rate_limit.booking_per_second.max(1)).max(1);
    // `key_extractor` returns a new builder, so it has to come first.
    let mut booking_builder = GovernorConfigBuilder::default().key_extractor(SmartIpKeyExtractor);
    booking_builder
        .per_millisecond(period_ms.into())
        .burst_size(config.rate_limit.booking_burst.max(1));
    booking_builder.error_handler(|error: GovernorError| -> http::Response<Body> {
        match error {
            GovernorError::TooManyRequests { wait_time, headers } => {
                let mut resp = AppError::RateLimited.into_response();
                if let Some(hmap) = headers {
                    for (name, value) in hmap.iter() {
                        resp.headers_mut().append(name.clone(), value.clone());
                    }
                }
                if let Ok(value) = HeaderValue::from_str(&wait_time.to_string()) {
                    resp.headers_mut().insert(http::header::RETRY_AFTER, value);
                }
                resp
            }
            GovernorError::UnableToExtractKey => {
                AppError::BadRequest("Unable to determine client IP for rate limiting".to_string())
                    .into_response()
            }
            GovernorError::Other { code, msg, headers } => {
                let body = msg.unwrap_or_else(|| "Rate limiting error".to_string());
                let mut resp = http::Response::new(Body::from(body));
                *resp.status_mut() = StatusCode::from_u16(code.as_u16())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if let Some(hmap) = headers {
                    for (name, value) in hmap.iter() {
                        resp.headers_mut().append(name.clone(), value.clone());
                    }
                }
                resp
            }
        }
    });

    let booking_gov_conf = Arc::new(
        booking_builder
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to build booking governor config"))?,
    );

    {
        let limiter = booking_gov_conf.limiter().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                tracing::debug!("booking rate limiter size: {}", limiter.len());
                limiter.retain_recent();
            }
        });
    }

    let booking_rate_layer = GovernorLayer {
        config: booking_gov_conf,
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .server
                .frontend_url
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid FRONTEND_URL for CORS: {}", e))?,
        )
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
            http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .merge(home::router())
        .merge(auth::router())
        .nest("/events", events::router())
        .nest("/schedule", schedule::router())
        .nest("/book", booking::router().layer(booking_rate_layer))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::middleware::from_fn(
                    middleware::security_headers::security_headers_middleware,
                )),
        );

    Ok(app)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, Router};
    use http::{HeaderMap, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::services::auth::test_support::{token_for, TEST_SECRET};
    use crate::services::init::test_pool;
    use crate::AppState;

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: serde_json::Value,
    }

    impl TestResponse {
        pub fn location(&self) -> Option<&str> {
            self.headers
                .get(http::header::LOCATION)
                .and_then(|v| v.to_str().ok())
        }
    }

    pub fn test_config() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = TEST_SECRET.to_string();
        config.server.public_url = "https://cal.example".to_string();
        config
    }

    pub async fn test_app_with(config: Config) -> (Router, SqlitePool) {
        let pool = test_pool().await;
        let state = Arc::new(AppState {
            db: pool.clone(),
            config,
        });
        (super::router(state).unwrap(), pool)
    }

    pub async fn test_app() -> (Router, SqlitePool) {
        test_app_with(test_config()).await
    }

    pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.7");
        if let Some(user) = user {
            builder = builder.header(
                http::header::AUTHORIZATION,
                format!("Bearer {}", token_for(user)),
            );
        }
        match body {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn get(app: &Router, uri: &str) -> TestResponse {
        send(app, request("GET", uri, None, None)).await
    }

    pub async fn get_as(app: &Router, uri: &str, user: &str) -> TestResponse {
        send(app, request("GET", uri, Some(user), None)).await
    }

    pub async fn post(
        app: &Router,
        uri: &str,
        user: Option<&str>,
        body: serde_json::Value,
    ) -> TestResponse {
        send(app, request("POST", uri, user, Some(body))).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let (app, _pool) = test_app().await;
        let res = get(&app, "/health").await;
        assert_eq!(res.status, http::StatusCode::OK);
        assert_eq!(res.body["status"], "healthy");
        assert!(res.headers.contains_key("content-security-policy"));
        assert_eq!(res.headers["x-content-type-options"], "nosniff");
    }
}
