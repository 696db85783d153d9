use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

mod auth;
mod config;
mod error;
mod handlers;
mod middleware;
mod store;

use handlers::tasks;
use store::TaskStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SECURITY_JWT_SECRET, STORE_BASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();
    tracing::info!("Starting Manda Tasks API in {:?} mode", config.environment);

    // Fail fast on configuration the service cannot run without
    if config.security.jwt_secret.is_empty() {
        eprintln!("SECURITY_JWT_SECRET must be set");
        std::process::exit(1);
    }
    if url::Url::parse(&config.store.base_url).is_err() {
        eprintln!("STORE_BASE_URL is missing or not a valid URL");
        std::process::exit(1);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("MANDA_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3003);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Manda Tasks API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let config = crate::config::config();

    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected task API
        .merge(task_routes());

    // Global middleware
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

fn task_routes() -> Router {
    Router::new()
        .route("/tasks", get(tasks::list))
        .route("/task", post(tasks::create))
        .route("/task/:id", patch(tasks::update))
        .route_layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    // No configured origins means permissive (local development)
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Manda Tasks API",
            "version": version,
            "description": "Task tracking API gateway built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "tasks": "GET /tasks (protected)",
                "task_create": "POST /task (protected)",
                "task_update": "PATCH /task/:id (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match TaskStore::instance().ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "task_store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "task store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "task_store_error": e.to_string()
                }
            })),
        ),
    }
}
