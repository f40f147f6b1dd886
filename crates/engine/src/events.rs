//! Event records and their amount/currency policy.
//!
//! An event carries one monetary total, `base_total`, denominated in the
//! event's own `currency_code`. The legacy `total_budget` column is kept as a
//! mirror of `base_total` so older readers keep working; it is never derived by
//! conversion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{
    EngineError, FieldErrors, ResultEngine,
    util::{
        MAX_CODE_LEN, check_len, normalize_currency_code, normalize_optional_text,
        optional_name, parse_stored_decimal, required_name, store_decimal,
    },
};

/// Currency used when an event never received a code.
pub const DEFAULT_CURRENCY_CODE: &str = "THB";

/// A stored event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
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
    /// Always equal to `base_total` after a write.
    pub total_budget: Option<Decimal>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Event fields as written by a client, already renamed to storage names.
///
/// Each patchable field is `None` when the client left it out and
/// `Some(None)` when it was sent empty. Creation requires `name` and
/// `start_date`. Updates keep the stored value of each absent field and
/// clear the ones sent empty; `name` and `start_date` cannot be cleared.
#[derive(Clone, Debug, Default)]
pub struct EventDraft {
    pub name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub client_name: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub venue_name: Option<Option<String>>,
    pub venue_url: Option<Option<String>>,
    pub accommodation_name: Option<Option<String>>,
    pub accommodation_url: Option<Option<String>>,
    pub drive_link: Option<Option<String>>,
    pub base_total: Option<Option<Decimal>>,
    /// Pre-`base_total` amount field, consulted only when `base_total` has no value.
    pub legacy_total: Option<Option<Decimal>>,
    /// A blank code counts as absent.
    pub currency_code: Option<String>,
}

/// Resolve the amount to store.
///
/// When neither `explicit` nor `legacy` was supplied the `existing` amount is
/// kept. Otherwise the first one carrying a value wins, and when both were
/// sent empty the amount is cleared.
pub fn resolve_base_total(
    explicit: Option<Option<Decimal>>,
    legacy: Option<Option<Decimal>>,
    existing: Option<Decimal>,
) -> Option<Decimal> {
    match (explicit, legacy) {
        (None, None) => existing,
        (explicit, legacy) => explicit.flatten().or(legacy.flatten()),
    }
}

/// Resolve the currency code to store.
///
/// A supplied, non-blank code wins; otherwise the existing code is kept, and
/// when there is none the `fallback` applies. The result is upper-cased.
pub fn resolve_currency_code(
    input: Option<&str>,
    existing: Option<&str>,
    fallback: &str,
) -> String {
    input
        .and_then(normalize_currency_code)
        .or_else(|| existing.and_then(normalize_currency_code))
        .or_else(|| normalize_currency_code(fallback))
        .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string())
}

fn new_text(value: Option<Option<String>>) -> Option<String> {
    normalize_optional_text(value.flatten().as_deref())
}

fn merge_text(input: Option<Option<String>>, stored: Option<String>) -> Option<String> {
    match input {
        Some(value) => normalize_optional_text(value.as_deref()),
        None => stored,
    }
}

impl EventDraft {
    /// The client-supplied currency code, normalized; `None` when absent or blank.
    pub(crate) fn supplied_currency(&self) -> Option<String> {
        self.currency_code
            .as_deref()
            .and_then(normalize_currency_code)
    }

    fn check_currency(&self, errors: &mut FieldErrors) {
        if let Some(code) = self.supplied_currency() {
            check_len(errors, "currency_code", code, MAX_CODE_LEN);
        }
    }

    /// Build the row for a new event.
    pub(crate) fn into_new_model(
        self,
        default_currency: &str,
        now: DateTimeUtc,
    ) -> ResultEngine<ActiveModel> {
        let mut errors = FieldErrors::new();
        self.check_currency(&mut errors);
        let name = required_name(&mut errors, "name", self.name.flatten().as_deref());
        let start_date = self.start_date.flatten();
        if start_date.is_none() {
            errors.add("start_date", START_DATE_REQUIRED);
        }

        let (Some(name), Some(start_date)) = (name, start_date) else {
            return Err(EngineError::Validation(errors));
        };
        errors.into_result()?;

        let total = store_decimal(resolve_base_total(self.base_total, self.legacy_total, None));
        let currency_code =
            resolve_currency_code(self.currency_code.as_deref(), None, default_currency);

        Ok(ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(new_text(self.description)),
            start_date: ActiveValue::Set(start_date),
            end_date: ActiveValue::Set(self.end_date.flatten()),
            client_name: ActiveValue::Set(new_text(self.client_name)),
            location: ActiveValue::Set(new_text(self.location)),
            venue_name: ActiveValue::Set(new_text(self.venue_name)),
            venue_url: ActiveValue::Set(new_text(self.venue_url)),
            accommodation_name: ActiveValue::Set(new_text(self.accommodation_name)),
            accommodation_url: ActiveValue::Set(new_text(self.accommodation_url)),
            drive_link: ActiveValue::Set(new_text(self.drive_link)),
            base_total: ActiveValue::Set(total.clone()),
            currency_code: ActiveValue::Set(currency_code),
            total_budget: ActiveValue::Set(total),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        })
    }

    /// Merge the draft over a stored row.
    pub(crate) fn apply_to(
        self,
        stored: Model,
        default_currency: &str,
        now: DateTimeUtc,
    ) -> ResultEngine<ActiveModel> {
        let mut errors = FieldErrors::new();
        let name = optional_name(&mut errors, "name", self.name.as_ref().map(Option::as_deref));
        let start_date = match self.start_date {
            Some(None) => {
                errors.add("start_date", START_DATE_REQUIRED);
                None
            }
            Some(date) => date,
            None => None,
        };
        self.check_currency(&mut errors);
        errors.into_result()?;

        let existing_total = parse_stored_decimal(stored.base_total.as_deref(), "base_total")?
            .or(parse_stored_decimal(
                stored.total_budget.as_deref(),
                "total_budget",
            )?);
        let total = store_decimal(resolve_base_total(
            self.base_total,
            self.legacy_total,
            existing_total,
        ));
        let currency_code = resolve_currency_code(
            self.currency_code.as_deref(),
            Some(stored.currency_code.as_str()),
            default_currency,
        );

        let mut active: ActiveModel = stored.clone().into();
        active.name = ActiveValue::Set(name.unwrap_or(stored.name));
        active.description = ActiveValue::Set(merge_text(self.description, stored.description));
        active.start_date = ActiveValue::Set(start_date.unwrap_or(stored.start_date));
        active.end_date = ActiveValue::Set(self.end_date.unwrap_or(stored.end_date));
        active.client_name = ActiveValue::Set(merge_text(self.client_name, stored.client_name));
        active.location = ActiveValue::Set(merge_text(self.location, stored.location));
        active.venue_name = ActiveValue::Set(merge_text(self.venue_name, stored.venue_name));
        active.venue_url = ActiveValue::Set(merge_text(self.venue_url, stored.venue_url));
        active.accommodation_name = ActiveValue::Set(merge_text(
            self.accommodation_name,
            stored.accommodation_name,
        ));
        active.accommodation_url = ActiveValue::Set(merge_text(
            self.accommodation_url,
            stored.accommodation_url,
        ));
        active.drive_link = ActiveValue::Set(merge_text(self.drive_link, stored.drive_link));
        active.base_total = ActiveValue::Set(total.clone());
        active.total_budget = ActiveValue::Set(total);
        active.currency_code = ActiveValue::Set(currency_code);
        active.updated_at = ActiveValue::Set(now);
        Ok(active)
    }
}

const START_DATE_REQUIRED: &str = "The start date field is required.";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub client_name: Option<String>,
    pub location: Option<String>,
    pub venue_name: Option<String>,
    pub venue_url: Option<String>,
    pub accommodation_name: Option<String>,
    pub accommodation_url: Option<String>,
    pub drive_link: Option<String>,
    pub base_total: Option<String>,
    pub currency_code: String,
    pub total_budget: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Event {
    type Error = DbErr;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            base_total: parse_stored_decimal(value.base_total.as_deref(), "base_total")?,
            total_budget: parse_stored_decimal(value.total_budget.as_deref(), "total_budget")?,
            id: value.id,
            name: value.name,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            client_name: value.client_name,
            location: value.location,
            venue_name: value.venue_name,
            venue_url: value.venue_url,
            accommodation_name: value.accommodation_name,
            accommodation_url: value.accommodation_url,
            drive_link: value.drive_link,
            currency_code: value.currency_code,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
