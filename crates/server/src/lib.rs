use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerConfig, router, run_with_listener};

mod categories;
mod currencies;
mod events;
mod extract;
mod server;

pub enum ServerError {
    Engine(EngineError),
    /// The body could not be read as JSON at all.
    Rejected(JsonRejection),
    Unavailable(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::Validation(fields) => Error {
            error: fields.to_string(),
            fields: Some(fields.fields().clone()),
        },
        other => Error {
            error: other.to_string(),
            fields: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Rejected(rejection) => (
                rejection.status(),
                Error {
                    error: rejection.body_text(),
                    fields: None,
                },
            ),
            ServerError::Unavailable(err) => {
                tracing::warn!("service unavailable: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Error {
                        error: err,
                        fields: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
