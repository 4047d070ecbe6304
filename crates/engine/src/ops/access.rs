use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, hangout_participants, hangouts, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(())
    }

    pub(super) async fn require_hangout(
        &self,
        db: &DatabaseTransaction,
        hangout_code: &str,
    ) -> ResultEngine<hangouts::Model> {
        hangouts::Entity::find_by_id(hangout_code.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("hangout not exists".to_string()))
    }

    pub(super) async fn is_participant(
        &self,
        db: &DatabaseTransaction,
        hangout_code: &str,
        user_id: &str,
    ) -> ResultEngine<bool> {
        hangout_participants::Entity::find_by_id((hangout_code.to_string(), user_id.to_string()))
            .one(db)
            .await
            .map(|row| row.is_some())
            .map_err(Into::into)
    }

    /// Resolves the hangout and checks that `user_id` takes part in it.
    pub(super) async fn require_participant(
        &self,
        db: &DatabaseTransaction,
        hangout_code: &str,
        user_id: &str,
    ) -> ResultEngine<hangouts::Model> {
        let hangout = self.require_hangout(db, hangout_code).await?;
        if !self.is_participant(db, hangout_code, user_id).await? {
            return Err(EngineError::Forbidden(format!(
                "{user_id} is not a participant of hangout {hangout_code}"
            )));
        }
        Ok(hangout)
    }

    pub(super) async fn participant_ids(
        &self,
        db: &DatabaseTransaction,
        hangout_code: &str,
    ) -> ResultEngine<HashSet<String>> {
        let rows = hangout_participants::Entity::find()
            .filter(hangout_participants::Column::HangoutCode.eq(hangout_code))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }
}
