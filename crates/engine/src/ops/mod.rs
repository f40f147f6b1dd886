use sea_orm::{DatabaseConnection, DeleteResult};

use crate::{
    EngineError, FieldErrors, ResultEngine, events::DEFAULT_CURRENCY_CODE,
    util::{MAX_CODE_LEN, check_len, normalize_currency_code},
};

mod categories;
mod currencies;
mod events;

pub use categories::CategoryChanges;
pub use currencies::{CurrencyChanges, NewCurrency};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every store operation.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    default_currency: String,
    strict_currency_codes: bool,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Currency code applied to events that never received one.
    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }
}

/// Turn an empty delete into a not-found failure.
fn ensure_deleted(result: DeleteResult, label: &str, id: i64) -> ResultEngine<()> {
    if result.rows_affected == 0 {
        return Err(EngineError::KeyNotFound(format!("{label} {id}")));
    }
    Ok(())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    default_currency: String,
    strict_currency_codes: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            default_currency: DEFAULT_CURRENCY_CODE.to_string(),
            strict_currency_codes: false,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the fallback currency for events (`THB` by default).
    pub fn default_currency(mut self, code: &str) -> EngineBuilder {
        self.default_currency = code.to_string();
        self
    }

    /// Require event currency codes to exist in the currency registry.
    pub fn strict_currency_codes(mut self, strict: bool) -> EngineBuilder {
        self.strict_currency_codes = strict;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let mut errors = FieldErrors::new();
        let default_currency = match normalize_currency_code(&self.default_currency) {
            Some(code) => check_len(&mut errors, "default_currency", code, MAX_CODE_LEN),
            None => {
                errors.add("default_currency", "The default currency must not be blank.");
                None
            }
        };
        let Some(default_currency) = default_currency else {
            return Err(EngineError::Validation(errors));
        };

        Ok(Engine {
            database: self.database,
            default_currency,
            strict_currency_codes: self.strict_currency_codes,
        })
    }
}
