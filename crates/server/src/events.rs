//! Event API endpoints.
//!
//! Requests use the client's field names (`country`, `client_website`,
//! `commended_*`, `online_drive`, `total`); responses use the storage names.

use api_types::event::{EventNew, EventUpdate, EventView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Event, EventDraft};

use crate::{ServerError, extract::JsonBody, server::ServerState};

fn draft_from_request(payload: EventNew) -> EventDraft {
    EventDraft {
        name: payload.name,
        description: payload.description,
        start_date: payload.start_date,
        end_date: payload.end_date,
        client_name: payload.client_name,
        location: payload.country,
        venue_name: payload.venue_name,
        venue_url: payload.client_website,
        accommodation_name: payload.commended_name,
        accommodation_url: payload.commended_website,
        drive_link: payload.online_drive,
        base_total: payload.base_total,
        legacy_total: payload.total,
        currency_code: payload.currency_code,
    }
}

fn map_event(event: Event) -> EventView {
    EventView {
        id: event.id,
        name: event.name,
        description: event.description,
        start_date: event.start_date,
        end_date: event.end_date,
        client_name: event.client_name,
        location: event.location,
        venue_name: event.venue_name,
        venue_url: event.venue_url,
        accommodation_name: event.accommodation_name,
        accommodation_url: event.accommodation_url,
        drive_link: event.drive_link,
        base_total: event.base_total,
        currency_code: event.currency_code,
        total_budget: event.total_budget,
        created_at: event.created_at,
        updated_at: event.updated_at,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<EventView>>, ServerError> {
    let events = state
        .engine
        .list_events()
        .await?
        .into_iter()
        .map(map_event)
        .collect();
    Ok(Json(events))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<EventNew>,
) -> Result<(StatusCode, Json<EventView>), ServerError> {
    let event = state
        .engine
        .create_event(draft_from_request(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_event(event))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(event_id): Path<i64>,
    JsonBody(payload): JsonBody<EventUpdate>,
) -> Result<Json<EventView>, ServerError> {
    let event = state
        .engine
        .update_event(event_id, draft_from_request(payload))
        .await?;
    Ok(Json(map_event(event)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(event_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_event(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn given(value: &str) -> Option<Option<String>> {
        Some(Some(value.to_string()))
    }

    #[test]
    fn request_names_map_to_storage_names() {
        let payload: EventNew = serde_json::from_value(serde_json::json!({
            "name": "Summit",
            "country": "Thailand",
            "client_website": "https://client.example",
            "commended_name": "Riverside Hotel",
            "commended_website": "https://hotel.example",
            "online_drive": "https://drive.example/folder",
            "total": "1200.50"
        }))
        .unwrap();

        let draft = draft_from_request(payload);
        assert_eq!(draft.location, given("Thailand"));
        assert_eq!(draft.venue_url, given("https://client.example"));
        assert_eq!(draft.accommodation_name, given("Riverside Hotel"));
        assert_eq!(draft.accommodation_url, given("https://hotel.example"));
        assert_eq!(draft.drive_link, given("https://drive.example/folder"));
        assert_eq!(draft.legacy_total, Some(Some("1200.50".parse().unwrap())));
        assert!(draft.base_total.is_none());
        assert!(draft.currency_code.is_none());
    }

    #[test]
    fn nulls_reach_the_draft_as_clears() {
        let payload: EventNew = serde_json::from_value(serde_json::json!({
            "country": null,
            "end_date": "",
            "total": null
        }))
        .unwrap();

        let draft = draft_from_request(payload);
        assert_eq!(draft.location, Some(None));
        assert_eq!(draft.end_date, Some(None));
        assert_eq!(draft.legacy_total, Some(None));
        assert_eq!(draft.venue_name, None);
    }
}
