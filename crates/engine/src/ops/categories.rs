use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Category, EngineError, FieldErrors, ResultEngine, categories,
    util::{MAX_TEXT_LEN, check_len, normalize_optional_text, optional_name, required_name},
};

use super::{Engine, ensure_deleted, with_tx};

/// Partial update of a category.
#[derive(Clone, Debug, Default)]
pub struct CategoryChanges {
    /// `Some(None)` is rejected: a category always has a name.
    pub name: Option<Option<String>>,
    /// `Some(None)` clears the icon.
    pub icon: Option<Option<String>>,
}

fn validated_icon(errors: &mut FieldErrors, icon: Option<&str>) -> Option<String> {
    normalize_optional_text(icon).and_then(|icon| check_len(errors, "icon", icon, MAX_TEXT_LEN))
}

impl Engine {
    /// All categories, ordered by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, id: i64) -> ResultEngine<Category> {
        categories::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Category::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))
    }

    pub async fn create_category(
        &self,
        name: Option<&str>,
        icon: Option<&str>,
    ) -> ResultEngine<Category> {
        let mut errors = FieldErrors::new();
        let name = required_name(&mut errors, "name", name);
        let icon = validated_icon(&mut errors, icon);
        let Some(name) = name.filter(|_| errors.is_empty()) else {
            return Err(EngineError::Validation(errors));
        };

        let now = Utc::now();
        let model = categories::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            icon: ActiveValue::Set(icon),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(id = model.id, name = %model.name, "category created");
        Ok(model.into())
    }

    /// Update the fields present in `changes`; absent ones are left untouched.
    pub async fn update_category(
        &self,
        id: i64,
        changes: CategoryChanges,
    ) -> ResultEngine<Category> {
        let mut errors = FieldErrors::new();
        let name = optional_name(
            &mut errors,
            "name",
            changes.name.as_ref().map(Option::as_deref),
        );
        let icon = changes
            .icon
            .map(|icon| validated_icon(&mut errors, icon.as_deref()));
        errors.into_result()?;

        with_tx!(self, |db_tx| {
            let stored = categories::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))?;

            let mut active: categories::ActiveModel = stored.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(icon);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            tracing::debug!(id, "category updated");
            Ok(Category::from(model))
        })
    }

    pub async fn delete_category(&self, id: i64) -> ResultEngine<()> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        ensure_deleted(result, "category", id)?;
        tracing::debug!(id, "category deleted");
        Ok(())
    }
}
