use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Hangout, Participant, ResultEngine, hangout_participants, hangouts,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Attempts before giving up on a free hangout code.
const CODE_ATTEMPTS: usize = 5;

impl Engine {
    /// Creates a hangout; the owner is its first participant.
    ///
    /// Returns the join code.
    pub async fn create_hangout(
        &self,
        name: &str,
        description: Option<&str>,
        owner: &str,
    ) -> ResultEngine<String> {
        let name = normalize_required_text(name, "hangout name")?;
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, owner).await?;

            let mut hangout = None;
            for _ in 0..CODE_ATTEMPTS {
                let candidate = Hangout::new(name.clone(), description.clone(), owner);
                if hangouts::Entity::find_by_id(candidate.code.clone())
                    .one(&db_tx)
                    .await?
                    .is_none()
                {
                    hangout = Some(candidate);
                    break;
                }
            }
            let hangout = hangout.ok_or_else(|| {
                EngineError::ExistingKey("no free hangout code available".to_string())
            })?;

            hangouts::ActiveModel::from(&hangout).insert(&db_tx).await?;
            hangout_participants::ActiveModel {
                hangout_code: ActiveValue::Set(hangout.code.clone()),
                user_id: ActiveValue::Set(owner.to_string()),
                joined_at: ActiveValue::Set(hangout.created_at),
            }
            .insert(&db_tx)
            .await?;

            Ok(hangout.code)
        })
    }

    /// Adds `user_id` to the hangout. Joining twice is a no-op.
    pub async fn join_hangout(&self, hangout_code: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            self.require_hangout(&db_tx, hangout_code).await?;
            if !self.is_participant(&db_tx, hangout_code, user_id).await? {
                hangout_participants::ActiveModel {
                    hangout_code: ActiveValue::Set(hangout_code.to_string()),
                    user_id: ActiveValue::Set(user_id.to_string()),
                    joined_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(())
        })
    }

    /// Hangout details (participants only).
    pub async fn hangout(&self, hangout_code: &str, user_id: &str) -> ResultEngine<Hangout> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_participant(&db_tx, hangout_code, user_id)
                .await?;
            Ok(Hangout::from(model))
        })
    }

    /// Participants ordered by join time (participants only).
    pub async fn hangout_participants(
        &self,
        hangout_code: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Participant>> {
        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, hangout_code, user_id)
                .await?;
            let rows = hangout_participants::Entity::find()
                .filter(hangout_participants::Column::HangoutCode.eq(hangout_code))
                .order_by_asc(hangout_participants::Column::JoinedAt)
                .order_by_asc(hangout_participants::Column::UserId)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Participant::from).collect())
        })
    }
}
