//! The currency registry.
//!
//! Each row maps a short code (`THB`, `USD`, ...) to a display name and an
//! optional multiplier towards the base currency. The registry stores rates
//! but never converts amounts.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::util::parse_stored_decimal;

/// A registered currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currency {
    pub id: i64,
    /// Upper-cased, unique code.
    pub code: String,
    pub name: String,
    /// Multiplier converting one unit of this currency into the base one.
    pub rate_to_base: Option<Decimal>,
    /// At most one currency carries this flag.
    pub is_base_currency: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub rate_to_base: Option<String>,
    pub is_base_currency: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Currency {
    type Error = DbErr;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            rate_to_base: parse_stored_decimal(value.rate_to_base.as_deref(), "rate_to_base")?,
            id: value.id,
            code: value.code,
            name: value.name,
            is_base_currency: value.is_base_currency,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
