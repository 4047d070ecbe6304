//! The settlement log.
//!
//! Every accepted submission writes one `settlements` row, its relations in
//! `settlement_relations`, and stamps the consumed contracts with the
//! settlement id.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Amount, EngineError, Relation as SettlementRelation, SettlementStrategy, settlement_relations,
    util::parse_uuid,
};

/// A persisted settlement with the contracts it consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: Uuid,
    pub hangout_code: String,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub strategy: SettlementStrategy,
    pub contract_ids: Vec<Uuid>,
    pub relations: Vec<SettlementRelation>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub hangout_code: String,
    pub submitted_by: String,
    pub submitted_at: DateTimeUtc,
    pub strategy: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::settlement_relations::Entity")]
    Relations,
}

impl Related<super::settlement_relations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SettlementRecord> for ActiveModel {
    fn from(record: &SettlementRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            hangout_code: ActiveValue::Set(record.hangout_code.clone()),
            submitted_by: ActiveValue::Set(record.submitted_by.clone()),
            submitted_at: ActiveValue::Set(record.submitted_at),
            strategy: ActiveValue::Set(record.strategy.as_str().to_string()),
        }
    }
}

impl SettlementRecord {
    pub(crate) fn relation_models(&self) -> Vec<settlement_relations::ActiveModel> {
        self.relations
            .iter()
            .enumerate()
            .map(|(position, relation)| settlement_relations::ActiveModel {
                settlement_id: ActiveValue::Set(self.id.to_string()),
                position: ActiveValue::Set(position as i32),
                creditor: ActiveValue::Set(relation.creditor.clone()),
                debtor: ActiveValue::Set(relation.debtor.clone()),
                amount: ActiveValue::Set(relation.amount.minor()),
            })
            .collect()
    }
}

impl TryFrom<(Model, Vec<settlement_relations::Model>, Vec<Uuid>)> for SettlementRecord {
    type Error = EngineError;

    fn try_from(
        (model, mut relation_models, contract_ids): (
            Model,
            Vec<settlement_relations::Model>,
            Vec<Uuid>,
        ),
    ) -> Result<Self, Self::Error> {
        relation_models.sort_by_key(|r| r.position);
        Ok(Self {
            id: parse_uuid(&model.id, "settlement")?,
            hangout_code: model.hangout_code,
            submitted_by: model.submitted_by,
            submitted_at: model.submitted_at,
            strategy: SettlementStrategy::try_from(model.strategy.as_str())?,
            contract_ids,
            relations: relation_models
                .into_iter()
                .map(|r| SettlementRelation::new(r.creditor, r.debtor, Amount::new(r.amount)))
                .collect(),
        })
    }
}
