//! Hangout participants: who may record and settle contracts in a hangout.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "hangout_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub hangout_code: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hangouts::Entity",
        from = "Column::HangoutCode",
        to = "super::hangouts::Column::Code",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Hangouts,
}

impl Related<super::hangouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hangouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Participant {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            joined_at: model.joined_at,
        }
    }
}
