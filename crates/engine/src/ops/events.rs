use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryOrder, TransactionTrait, prelude::*};

use crate::{Event, EngineError, EventDraft, FieldErrors, ResultEngine, events};

use super::{Engine, ensure_deleted, with_tx};

impl Engine {
    /// Events, most recent `start_date` first.
    pub async fn list_events(&self) -> ResultEngine<Vec<Event>> {
        let models = events::Entity::find()
            .order_by_desc(events::Column::StartDate)
            .order_by_desc(events::Column::Id)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(|model| Event::try_from(model).map_err(EngineError::from))
            .collect()
    }

    /// Create an event.
    ///
    /// The currency defaults to the engine's default currency and the
    /// resolved amount is written to both `base_total` and `total_budget`.
    pub async fn create_event(&self, draft: EventDraft) -> ResultEngine<Event> {
        let supplied_currency = draft.supplied_currency();
        let active = draft.into_new_model(&self.default_currency, Utc::now())?;

        with_tx!(self, |db_tx| {
            self.check_event_currency(&db_tx, supplied_currency.as_deref())
                .await?;
            let model = active.insert(&db_tx).await?;
            tracing::debug!(id = model.id, currency = %model.currency_code, "event created");
            Ok(Event::try_from(model)?)
        })
    }

    /// Update an event; fields absent from `draft` keep their stored values.
    pub async fn update_event(&self, id: i64, draft: EventDraft) -> ResultEngine<Event> {
        let supplied_currency = draft.supplied_currency();

        with_tx!(self, |db_tx| {
            let stored = events::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("event {id}")))?;

            self.check_event_currency(&db_tx, supplied_currency.as_deref())
                .await?;
            let active = draft.apply_to(stored, &self.default_currency, Utc::now())?;
            let model = active.update(&db_tx).await?;
            tracing::debug!(id, currency = %model.currency_code, "event updated");
            Ok(Event::try_from(model)?)
        })
    }

    pub async fn delete_event(&self, id: i64) -> ResultEngine<()> {
        let result = events::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        ensure_deleted(result, "event", id)?;
        tracing::debug!(id, "event deleted");
        Ok(())
    }

    /// With strict currency codes on, a supplied code must be registered.
    ///
    /// The engine default is always accepted.
    async fn check_event_currency(
        &self,
        db_tx: &DatabaseTransaction,
        code: Option<&str>,
    ) -> ResultEngine<()> {
        let Some(code) = code else {
            return Ok(());
        };
        if !self.strict_currency_codes || code == self.default_currency {
            return Ok(());
        }
        if Self::currency_code_exists(db_tx, code).await? {
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        errors.add(
            "currency_code",
            format!("The selected currency code {code} is not registered."),
        );
        errors.into_result()
    }
}
