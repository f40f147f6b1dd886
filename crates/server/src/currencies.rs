//! Currency registry API endpoints.

use api_types::currency::{CurrencyNew, CurrencyUpdate, CurrencyView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, extract::JsonBody, server::ServerState};

fn map_currency(currency: engine::Currency) -> CurrencyView {
    CurrencyView {
        id: currency.id,
        code: currency.code,
        name: currency.name,
        rate_to_base: currency.rate_to_base,
        is_base_currency: currency.is_base_currency,
        created_at: currency.created_at,
        updated_at: currency.updated_at,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CurrencyView>>, ServerError> {
    let currencies = state
        .engine
        .list_currencies()
        .await?
        .into_iter()
        .map(map_currency)
        .collect();
    Ok(Json(currencies))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(currency_id): Path<i64>,
) -> Result<Json<CurrencyView>, ServerError> {
    let currency = state.engine.currency(currency_id).await?;
    Ok(Json(map_currency(currency)))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<CurrencyNew>,
) -> Result<(StatusCode, Json<CurrencyView>), ServerError> {
    let currency = state
        .engine
        .create_currency(engine::NewCurrency {
            code: payload.code,
            name: payload.name,
            rate_to_base: payload.rate_to_base,
            is_base_currency: payload.is_base_currency,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_currency(currency))))
}

/// Serves both `PUT` and `PATCH`; `code` and `name` are always required.
pub async fn update(
    State(state): State<ServerState>,
    Path(currency_id): Path<i64>,
    JsonBody(payload): JsonBody<CurrencyUpdate>,
) -> Result<Json<CurrencyView>, ServerError> {
    let currency = state
        .engine
        .update_currency(
            currency_id,
            engine::CurrencyChanges {
                code: payload.code,
                name: payload.name,
                rate_to_base: payload.rate_to_base,
                is_base_currency: payload.is_base_currency,
            },
        )
        .await?;
    Ok(Json(map_currency(currency)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(currency_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_currency(currency_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
