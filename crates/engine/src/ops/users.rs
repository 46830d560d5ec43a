use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, EngineResult, auth, categories, users, util};

use super::{Engine, categories::DEFAULT_CATEGORIES, with_tx};

impl Engine {
    /// Create an account and seed it with the default category set.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> EngineResult<users::Model> {
        let email = util::normalize_required_name(email, "email")?.to_lowercase();
        let username = util::normalize_required_name(username, "username")?;
        if password.len() < 8 {
            return Err(EngineError::InvalidName(
                "password must be at least 8 characters".to_string(),
            ));
        }
        let password_hash = auth::hash_password(password);

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(
                    users::Column::Email
                        .eq(email.clone())
                        .or(users::Column::Username.eq(username.clone())),
                )
                .one(&db_tx)
                .await?;
            if let Some(existing) = taken {
                let which = if existing.email == email {
                    "email"
                } else {
                    "username"
                };
                return Err(EngineError::ExistingKey(which.to_string()));
            }

            let user = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                email: ActiveValue::Set(email),
                username: ActiveValue::Set(username),
                password_hash: ActiveValue::Set(password_hash),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            for seed in DEFAULT_CATEGORIES {
                categories::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(user.id),
                    name: ActiveValue::Set(seed.name.to_string()),
                    name_norm: ActiveValue::Set(util::normalize_name(seed.name)),
                    is_default: ActiveValue::Set(true),
                    icon: ActiveValue::Set(Some(seed.icon.to_string())),
                    color: ActiveValue::Set(Some(seed.color.to_string())),
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::info!(user_id = %user.id, username = %user.username, "registered user");
            Ok(user)
        })
    }

    /// Check a username/password pair, returning the account on success.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> EngineResult<users::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::Unauthorized("invalid credentials".to_string()))?;
        if !auth::verify_password(password, &user.password_hash) {
            return Err(EngineError::Unauthorized("invalid credentials".to_string()));
        }
        if !user.is_active {
            return Err(EngineError::Unauthorized("account is disabled".to_string()));
        }
        Ok(user)
    }
}
