//! Categories API endpoints.

use api_types::category::{CategoryCreate, CategoryUpdate, CategoryView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, extract::JsonBody, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        icon: category.icon,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(category_id).await?;
    Ok(Json(map_category(category)))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(payload.name.as_deref(), payload.icon.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(category_id): Path<i64>,
    JsonBody(payload): JsonBody<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(
            category_id,
            engine::CategoryChanges {
                name: payload.name,
                icon: payload.icon,
            },
        )
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(category_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
