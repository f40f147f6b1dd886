//! Request body extraction with field-level errors.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use engine::{EngineError, FieldErrors};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ServerError;

/// JSON body whose malformed values are reported per field.
///
/// Syntax errors and a missing content type keep axum's status codes; a
/// well-formed body whose values do not fit `T` becomes a validation error.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(ServerError::Rejected)?;

        match T::deserialize(&value) {
            Ok(payload) => Ok(JsonBody(payload)),
            Err(err) => Err(EngineError::Validation(invalid_fields::<T>(&value, &err)).into()),
        }
    }
}

/// Attribute a deserialization failure to the keys that cause it.
///
/// Request bodies only carry optional fields, so each key can be checked on
/// its own.
fn invalid_fields<T: DeserializeOwned>(value: &Value, err: &serde_json::Error) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Value::Object(map) = value {
        for (key, field) in map {
            let mut single = Map::new();
            single.insert(key.clone(), field.clone());
            if let Err(field_err) = T::deserialize(&Value::Object(single)) {
                errors.add(key, format!("The {key} field is invalid: {field_err}."));
            }
        }
    }
    if errors.is_empty() {
        errors.add("body", format!("The request body is invalid: {err}."));
    }
    errors
}
