use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, EngineResult, categories, util};

use super::Engine;

pub(crate) struct CategorySeed {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Seeded for every new account. The categorizer is trained on the same
/// label set, so predicted labels always resolve to one of these.
pub(crate) const DEFAULT_CATEGORIES: &[CategorySeed] = &[
    CategorySeed { name: "Food & Dining", icon: "🍽️", color: "#FF6B6B" },
    CategorySeed { name: "Shopping", icon: "🛍️", color: "#4ECDC4" },
    CategorySeed { name: "Transportation", icon: "🚗", color: "#45B7D1" },
    CategorySeed { name: "Bills & Utilities", icon: "🧾", color: "#96CEB4" },
    CategorySeed { name: "Entertainment", icon: "🎬", color: "#FFEAA7" },
    CategorySeed { name: "Healthcare", icon: "🏥", color: "#DDA0DD" },
    CategorySeed { name: "Education", icon: "📚", color: "#98D8C8" },
    CategorySeed { name: "Travel", icon: "✈️", color: "#F7DC6F" },
    CategorySeed { name: "Groceries", icon: "🛒", color: "#BB8FCE" },
    CategorySeed { name: "ATM/Cash", icon: "🏧", color: "#85C1E9" },
    CategorySeed { name: "Income", icon: "💰", color: "#82E0AA" },
    CategorySeed { name: "Others", icon: "📦", color: "#AEB6BF" },
];

impl Engine {
    pub async fn list_categories(&self, user_id: Uuid) -> EngineResult<Vec<categories::Model>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?)
    }

    /// Add a custom category. Names are unique per user after normalization.
    pub async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> EngineResult<categories::Model> {
        let name = util::normalize_required_name(name, "category")?;
        let name_norm = util::normalize_name(&name);

        let exists = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq(name_norm.clone()))
            .one(&self.database)
            .await?
            .is_some();
        if exists {
            return Err(EngineError::ExistingKey(name));
        }

        Ok(categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(name_norm),
            is_default: ActiveValue::Set(false),
            icon: ActiveValue::Set(util::normalize_optional_text(icon)),
            color: ActiveValue::Set(util::normalize_optional_text(color)),
        }
        .insert(&self.database)
        .await?)
    }

    /// Resolve a category name for `user_id`, falling back to `Others` when
    /// the name is absent or unknown.
    pub(crate) async fn resolve_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        name: Option<&str>,
    ) -> EngineResult<Option<categories::Model>> {
        if let Some(name) = name {
            let found = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .filter(categories::Column::NameNorm.eq(util::normalize_name(name)))
                .one(db)
                .await?;
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq("others"))
            .one(db)
            .await?)
    }

    pub(crate) async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> EngineResult<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }
}
