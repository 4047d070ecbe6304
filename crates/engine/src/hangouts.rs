//! A hangout is the group contracts are recorded and settled in.
//!
//! It is addressed by a short upper-case `code` that participants share to
//! join.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) const CODE_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hangout {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

impl Hangout {
    pub(crate) fn new(name: String, description: Option<String>, owner: &str) -> Self {
        Self {
            code: new_code(),
            name,
            description,
            owner: owner.to_string(),
            created_at: Utc::now(),
        }
    }
}

const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random upper-case alphanumeric code drawn from the bits of a v4 UUID.
fn new_code() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let base = CODE_ALPHABET.len() as u128;
    (0..CODE_LEN)
        .map(|_| {
            let idx = (bits % base) as usize;
            bits /= base;
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "hangouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hangout_participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::contracts::Entity")]
    Contracts,
}

impl Related<super::hangout_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Hangout> for ActiveModel {
    fn from(hangout: &Hangout) -> Self {
        Self {
            code: ActiveValue::Set(hangout.code.clone()),
            name: ActiveValue::Set(hangout.name.clone()),
            description: ActiveValue::Set(hangout.description.clone()),
            owner: ActiveValue::Set(hangout.owner.clone()),
            created_at: ActiveValue::Set(hangout.created_at),
        }
    }
}

impl From<Model> for Hangout {
    fn from(model: Model) -> Self {
        Self {
            code: model.code,
            name: model.name,
            description: model.description,
            owner: model.owner,
            created_at: model.created_at,
        }
    }
}
