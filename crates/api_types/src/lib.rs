use std::{fmt, marker::PhantomData};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, IntoDeserializer, Visitor},
};

/// Deserialize a field that distinguishes "absent" from "explicit `null`".
///
/// Use together with `#[serde(default)]`: an absent key stays `None`, a
/// `null` becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Like [`double_option`], but a blank string also counts as `null`.
///
/// Web forms post empty inputs as `""`; for dates and amounts that means
/// "no value", not a parse error.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    deserializer
        .deserialize_any(NullableVisitor(PhantomData))
        .map(Some)
}

struct NullableVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for NullableVisitor<T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a value, an empty string or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            return Ok(None);
        }
        T::deserialize(v.into_deserializer()).map(Some)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        T::deserialize(v.into_deserializer()).map(Some)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        T::deserialize(v.into_deserializer()).map(Some)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        T::deserialize(v.into_deserializer()).map(Some)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        T::deserialize(v.into_deserializer()).map(Some)
    }
}

pub mod event {
    use super::*;

    /// Request body for `POST /events` and `PUT /events/{id}`.
    ///
    /// Field names follow the web form, not the storage columns:
    /// `country`, `client_website`, `commended_name`, `commended_website`,
    /// `online_drive` and the legacy `total`.
    ///
    /// Each field is `None` when absent and `Some(None)` when sent as `null`
    /// or `""`. On update the first keeps the stored value, the second
    /// clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct EventNew {
        #[serde(deserialize_with = "nullable")]
        pub name: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub description: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub start_date: Option<Option<NaiveDate>>,
        #[serde(deserialize_with = "nullable")]
        pub end_date: Option<Option<NaiveDate>>,
        #[serde(deserialize_with = "nullable")]
        pub client_name: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub country: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub venue_name: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub client_website: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub commended_name: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub commended_website: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub online_drive: Option<Option<String>>,
        #[serde(deserialize_with = "nullable")]
        pub base_total: Option<Option<Decimal>>,
        /// Legacy amount field, used when `base_total` is absent.
        #[serde(deserialize_with = "nullable")]
        pub total: Option<Option<Decimal>>,
        /// `null` and `""` count as absent: the stored code is kept.
        pub currency_code: Option<String>,
    }

    /// Updates accept the same vocabulary; absent fields keep stored values.
    pub type EventUpdate = EventNew;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventView {
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub client_name: Option<String>,
        pub location: Option<String>,
        pub venue_name: Option<String>,
        pub venue_url: Option<String>,
        pub accommodation_name: Option<String>,
        pub accommodation_url: Option<String>,
        pub drive_link: Option<String>,
        pub base_total: Option<Decimal>,
        pub currency_code: String,
        pub total_budget: Option<Decimal>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        /// Optional, but an explicit `null` is rejected.
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub name: Option<Option<String>>,
        /// `null` clears the icon, an absent key leaves it untouched.
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub icon: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub name: String,
        pub icon: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod currency {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CurrencyNew {
        pub code: Option<String>,
        pub name: Option<String>,
        pub rate_to_base: Option<Decimal>,
        pub is_base_currency: Option<bool>,
    }

    /// `code` and `name` are replaced; `rate_to_base` is partial.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CurrencyUpdate {
        pub code: Option<String>,
        pub name: Option<String>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub rate_to_base: Option<Option<Decimal>>,
        pub is_base_currency: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyView {
        pub id: i64,
        pub code: String,
        pub name: String,
        pub rate_to_base: Option<Decimal>,
        pub is_base_currency: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}
