use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header},
    routing::get,
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::sync::Arc;

use crate::{ServerError, categories, currencies, events};
use api_types::health::Health;
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// HTTP-level settings that do not belong to the engine.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

/// Build the CORS layer for the web client.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(value) => allowed.push(value),
            Err(_) => tracing::warn!("CORS: ignoring invalid origin '{origin}'"),
        }
    }
    tracing::info!("CORS: allowing {} origin(s)", allowed.len());

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Liveness probe; also checks the database connection.
async fn health(State(state): State<ServerState>) -> Result<Json<Health>, ServerError> {
    state
        .db
        .ping()
        .await
        .map_err(|err| ServerError::Unavailable(format!("database unreachable: {err}")))?;
    Ok(Json(Health {
        status: "ok".to_string(),
    }))
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/{id}",
            axum::routing::put(events::update).delete(events::delete),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/currencies", get(currencies::list).post(currencies::create))
        .route(
            "/currencies/{id}",
            get(currencies::get)
                .put(currencies::update)
                .patch(currencies::update)
                .delete(currencies::delete),
        )
        .route("/health", get(health))
}

/// The full application router, served both at the root and under `/api`.
pub fn router(engine: Engine, db: DatabaseConnection, config: &ServerConfig) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
    config: ServerConfig,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, db, &config)).await
}
