//! Storage and policy layer for the event-budgeting admin.
//!
//! Three independent stores live behind [`Engine`]:
//!
//! - the currency registry ([`Currency`])
//! - budget categories ([`Category`])
//! - event records ([`Event`]), including the amount/currency policy
//!
//! Every operation maps to a single row read or write.

pub use categories::Category;
pub use currencies::Currency;
pub use error::{EngineError, FieldErrors};
pub use events::{DEFAULT_CURRENCY_CODE, Event, EventDraft, resolve_base_total, resolve_currency_code};
pub use ops::{CategoryChanges, CurrencyChanges, Engine, EngineBuilder, NewCurrency};

mod categories;
mod currencies;
mod error;
mod events;
mod ops;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
