use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Currency, EngineError, FieldErrors, ResultEngine, currencies,
    util::{required_code, required_name, store_decimal},
};

use super::{Engine, ensure_deleted, with_tx};

/// Input for registering a currency.
#[derive(Clone, Debug, Default)]
pub struct NewCurrency {
    pub code: Option<String>,
    pub name: Option<String>,
    pub rate_to_base: Option<Decimal>,
    pub is_base_currency: Option<bool>,
}

/// Replacement of a currency's code and name, with a partial rate.
#[derive(Clone, Debug, Default)]
pub struct CurrencyChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    /// `None` keeps the stored rate, `Some(None)` clears it.
    pub rate_to_base: Option<Option<Decimal>>,
    pub is_base_currency: Option<bool>,
}

fn validate_code_and_name(
    code: Option<&str>,
    name: Option<&str>,
) -> ResultEngine<(String, String)> {
    let mut errors = FieldErrors::new();
    let code = required_code(&mut errors, "code", code);
    let name = required_name(&mut errors, "name", name);
    match (code, name) {
        (Some(code), Some(name)) if errors.is_empty() => Ok((code, name)),
        _ => Err(EngineError::Validation(errors)),
    }
}

impl Engine {
    /// Every registered currency, in insertion order.
    pub async fn list_currencies(&self) -> ResultEngine<Vec<Currency>> {
        let models = currencies::Entity::find()
            .order_by_asc(currencies::Column::Id)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(|model| Currency::try_from(model).map_err(EngineError::from))
            .collect()
    }

    pub async fn currency(&self, id: i64) -> ResultEngine<Currency> {
        let model = currencies::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("currency {id}")))?;
        Ok(Currency::try_from(model)?)
    }

    /// The currency flagged as base, if any.
    pub async fn base_currency(&self) -> ResultEngine<Option<Currency>> {
        let model = currencies::Entity::find()
            .filter(currencies::Column::IsBaseCurrency.eq(true))
            .order_by_asc(currencies::Column::Id)
            .one(&self.database)
            .await?;
        Ok(model.map(Currency::try_from).transpose()?)
    }

    pub async fn create_currency(&self, input: NewCurrency) -> ResultEngine<Currency> {
        let (code, name) = validate_code_and_name(input.code.as_deref(), input.name.as_deref())?;
        let is_base = input.is_base_currency.unwrap_or(false);

        with_tx!(self, |db_tx| {
            Self::ensure_code_free(&db_tx, &code, None).await?;
            if is_base {
                Self::ensure_no_other_base(&db_tx, None).await?;
            }

            let now = Utc::now();
            let model = currencies::ActiveModel {
                id: ActiveValue::NotSet,
                code: ActiveValue::Set(code),
                name: ActiveValue::Set(name),
                rate_to_base: ActiveValue::Set(store_decimal(input.rate_to_base)),
                is_base_currency: ActiveValue::Set(is_base),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            tracing::debug!(id = model.id, code = %model.code, "currency created");
            Ok(Currency::try_from(model)?)
        })
    }

    pub async fn update_currency(
        &self,
        id: i64,
        changes: CurrencyChanges,
    ) -> ResultEngine<Currency> {
        let (code, name) =
            validate_code_and_name(changes.code.as_deref(), changes.name.as_deref())?;

        with_tx!(self, |db_tx| {
            let stored = currencies::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("currency {id}")))?;

            Self::ensure_code_free(&db_tx, &code, Some(id)).await?;
            if changes.is_base_currency == Some(true) && !stored.is_base_currency {
                Self::ensure_no_other_base(&db_tx, Some(id)).await?;
            }

            let mut active: currencies::ActiveModel = stored.into();
            active.code = ActiveValue::Set(code);
            active.name = ActiveValue::Set(name);
            if let Some(rate) = changes.rate_to_base {
                active.rate_to_base = ActiveValue::Set(store_decimal(rate));
            }
            if let Some(is_base) = changes.is_base_currency {
                active.is_base_currency = ActiveValue::Set(is_base);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            tracing::debug!(id, code = %model.code, "currency updated");
            Ok(Currency::try_from(model)?)
        })
    }

    pub async fn delete_currency(&self, id: i64) -> ResultEngine<()> {
        let result = currencies::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        ensure_deleted(result, "currency", id)?;
        tracing::debug!(id, "currency deleted");
        Ok(())
    }

    /// Whether `code` is registered.
    pub(super) async fn currency_code_exists(
        db_tx: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<bool> {
        let found = currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code))
            .one(db_tx)
            .await?;
        Ok(found.is_some())
    }

    async fn ensure_code_free(
        db_tx: &DatabaseTransaction,
        code: &str,
        except_id: Option<i64>,
    ) -> ResultEngine<()> {
        let mut query = currencies::Entity::find().filter(currencies::Column::Code.eq(code));
        if let Some(id) = except_id {
            query = query.filter(currencies::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(code.to_string()));
        }
        Ok(())
    }

    /// Keep the "at most one base currency" invariant.
    async fn ensure_no_other_base(
        db_tx: &DatabaseTransaction,
        except_id: Option<i64>,
    ) -> ResultEngine<()> {
        let mut query =
            currencies::Entity::find().filter(currencies::Column::IsBaseCurrency.eq(true));
        if let Some(id) = except_id {
            query = query.filter(currencies::Column::Id.ne(id));
        }
        if let Some(base) = query.one(db_tx).await? {
            return Err(EngineError::ExistingKey(format!(
                "base currency {}",
                base.code
            )));
        }
        Ok(())
    }
}
