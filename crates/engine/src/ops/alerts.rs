use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{EngineError, EngineResult, alerts};

use super::Engine;

/// Alert listings are capped; clients poll for recent ones.
const LIST_CAP: u64 = 20;

impl Engine {
    pub async fn list_alerts(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> EngineResult<Vec<alerts::Model>> {
        let mut select = alerts::Entity::find()
            .filter(alerts::Column::UserId.eq(user_id))
            .order_by_desc(alerts::Column::CreatedAt)
            .limit(LIST_CAP);
        if unread_only {
            select = select.filter(alerts::Column::IsRead.eq(false));
        }
        Ok(select.all(&self.database).await?)
    }

    pub async fn mark_alert_read(&self, user_id: Uuid, alert_id: Uuid) -> EngineResult<alerts::Model> {
        let alert = alerts::Entity::find_by_id(alert_id)
            .filter(alerts::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("alert not exists".to_string()))?;
        let mut active: alerts::ActiveModel = alert.into();
        active.is_read = ActiveValue::Set(true);
        Ok(active.update(&self.database).await?)
    }
}
