//! textonly - a minimal single-author text blog with a JSON management API

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;
pub mod validator;

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{pages, posts, rss, socials, users};
use crate::state::AppState;
use crate::templates::Templates;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON API routes.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/healthcheck", get(routes::health::healthcheck))
        .route(
            "/api/post",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/api/post/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/api/social",
            get(socials::list_socials).post(socials::create_social),
        )
        .route("/api/social/{id}", get(socials::get_social))
        .route("/api/user", get(users::list_users))
        .route(
            "/api/user/{id}",
            get(users::get_user).put(users::update_user),
        )
}

/// Server rendered pages and the feed.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/post", get(pages::posts))
        .route("/post/{id}", get(pages::read_post))
        .route("/about", get(pages::about))
        .route("/latest", get(pages::latest))
        .route("/feed", get(rss::feed))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let router = api_routes()
        .merge(page_routes())
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(axum_middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::headers::catch_panic_layer());

    middleware::headers::with_secure_headers(router).with_state(state)
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Guards must live as long as the server; dropping them stops the
    // background log writers.
    let environment = std::env::var("TEXTONLY_ENV").unwrap_or_else(|_| "development".to_string());
    let _log_guards = logging::init(&environment);

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        environment = %config.environment,
        bind = %config.bind_addr,
        database = %config.db.redacted_url(),
        "configuration loaded"
    );

    let pool = db::init_pool(&config.db)
        .await
        .context("failed to connect to the database")?;
    db::ensure_schema(&pool)
        .await
        .context("failed to prepare the database schema")?;

    let templates = Templates::new().context("failed to load templates")?;

    let addr = config.bind_addr;
    let app = create_app(AppState::new(config, pool, templates));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "TEXTONLY_PASSWORD" => Some("hunter2".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://127.0.0.1:1/unused")
            .unwrap();
        AppState::new(config, pool, Templates::new().unwrap())
    }

    #[tokio::test]
    async fn test_create_app_returns_router() {
        let _app = create_app(test_state());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let res = create_app(test_state())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers()["x-frame-options"], "deny");
    }
}
