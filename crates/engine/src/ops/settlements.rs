use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Contract, ContractStatus, EngineError, Relation, ResultEngine, SettlementRecord,
    SubmitSettlementCmd,
    contracts::{self, load_contracts},
    settle, settlement_relations, settlements,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Loads the selected contracts in request order, checking that the set is
    /// non-empty, has no duplicates, belongs to the hangout and is still
    /// pending.
    async fn pending_selection(
        &self,
        db: &DatabaseTransaction,
        hangout_code: &str,
        contract_ids: &[Uuid],
    ) -> ResultEngine<Vec<Contract>> {
        if contract_ids.is_empty() {
            return Err(EngineError::Validation(
                "no contracts selected".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = contract_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(EngineError::InvalidContractSet(format!(
                "contract {dup} selected more than once"
            )));
        }

        let ids: Vec<String> = contract_ids.iter().map(Uuid::to_string).collect();
        let models = contracts::Entity::find()
            .filter(contracts::Column::Id.is_in(ids))
            .filter(contracts::Column::HangoutCode.eq(hangout_code))
            .all(db)
            .await?;
        let mut by_id: HashMap<Uuid, Contract> = load_contracts(db, models)
            .await?
            .into_iter()
            .map(|contract| (contract.id, contract))
            .collect();

        let missing: Vec<String> = contract_ids
            .iter()
            .filter(|id| !by_id.contains_key(*id))
            .map(Uuid::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::InvalidContractSet(format!(
                "contracts not found in hangout {hangout_code}: {}",
                missing.join(", ")
            )));
        }

        let submitted: Vec<String> = contract_ids
            .iter()
            .filter(|id| by_id.get(*id).is_some_and(Contract::is_submitted))
            .map(Uuid::to_string)
            .collect();
        if !submitted.is_empty() {
            return Err(EngineError::AlreadySubmitted(format!(
                "contracts already settled: {}",
                submitted.join(", ")
            )));
        }

        Ok(contract_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    /// Computes the relations that would settle the selected contracts.
    ///
    /// Dry run: nothing is written.
    pub async fn calculate_settlement(
        &self,
        hangout_code: &str,
        contract_ids: &[Uuid],
        user_id: &str,
    ) -> ResultEngine<Vec<Relation>> {
        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, hangout_code, user_id)
                .await?;
            let contracts = self
                .pending_selection(&db_tx, hangout_code, contract_ids)
                .await?;
            settle(&contracts, self.strategy)
        })
    }

    /// Marks the selected contracts as submitted and records the relations.
    ///
    /// All or nothing: the relations must match a fresh calculation, and if
    /// any contract stopped being pending (including through a concurrent
    /// submission) nothing is written.
    pub async fn submit_settlement(
        &self,
        cmd: SubmitSettlementCmd,
    ) -> ResultEngine<SettlementRecord> {
        let SubmitSettlementCmd {
            hangout_code,
            contract_ids,
            relations,
            user_id,
        } = cmd;
        let ids: Vec<String> = contract_ids.iter().map(Uuid::to_string).collect();
        with_tx!(self, |db_tx| {
            // The first statement writes, so SQLite takes the write lock
            // before any snapshot is read and overlapping submissions queue.
            contracts::Entity::update_many()
                .col_expr(
                    contracts::Column::Status,
                    Expr::col(contracts::Column::Status).into(),
                )
                .filter(contracts::Column::Id.is_in(ids.clone()))
                .exec(&db_tx)
                .await?;

            self.require_participant(&db_tx, &hangout_code, &user_id)
                .await?;
            let contracts = self
                .pending_selection(&db_tx, &hangout_code, &contract_ids)
                .await?;

            let expected = settle(&contracts, self.strategy)?;
            let mut confirmed = relations;
            confirmed.sort();
            if confirmed != expected {
                return Err(EngineError::Validation(
                    "relations do not match calculation".to_string(),
                ));
            }

            let record = SettlementRecord {
                id: Uuid::new_v4(),
                hangout_code: hangout_code.clone(),
                submitted_by: user_id.clone(),
                submitted_at: Utc::now(),
                strategy: self.strategy,
                contract_ids: contract_ids.clone(),
                relations: expected,
            };
            settlements::ActiveModel::from(&record)
                .insert(&db_tx)
                .await?;
            let relation_models = record.relation_models();
            if !relation_models.is_empty() {
                settlement_relations::Entity::insert_many(relation_models)
                    .exec(&db_tx)
                    .await?;
            }

            let updated = contracts::Entity::update_many()
                .col_expr(
                    contracts::Column::Status,
                    Expr::value(ContractStatus::Submitted.as_str()),
                )
                .col_expr(
                    contracts::Column::SettlementId,
                    Expr::value(record.id.to_string()),
                )
                .col_expr(
                    contracts::Column::SubmittedAt,
                    Expr::value(record.submitted_at),
                )
                .filter(contracts::Column::Id.is_in(ids))
                .filter(contracts::Column::HangoutCode.eq(hangout_code.as_str()))
                .filter(contracts::Column::Status.eq(ContractStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if updated.rows_affected != contract_ids.len() as u64 {
                return Err(EngineError::AlreadySubmitted(
                    "contracts were settled concurrently".to_string(),
                ));
            }

            Ok(record)
        })
    }

    /// Past settlements of the hangout, newest first.
    pub async fn settlement_history(
        &self,
        hangout_code: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<SettlementRecord>> {
        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, hangout_code, user_id)
                .await?;
            let models = settlements::Entity::find()
                .filter(settlements::Column::HangoutCode.eq(hangout_code))
                .order_by_desc(settlements::Column::SubmittedAt)
                .order_by_asc(settlements::Column::Id)
                .all(&db_tx)
                .await?;
            let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();

            let relation_models = settlement_relations::Entity::find()
                .filter(settlement_relations::Column::SettlementId.is_in(ids.clone()))
                .all(&db_tx)
                .await?;
            let consumed = contracts::Entity::find()
                .filter(contracts::Column::SettlementId.is_in(ids))
                .order_by_asc(contracts::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut records = Vec::with_capacity(models.len());
            for model in models {
                let relations = relation_models
                    .iter()
                    .filter(|r| r.settlement_id == model.id)
                    .cloned()
                    .collect();
                let contract_ids = consumed
                    .iter()
                    .filter(|c| c.settlement_id.as_deref() == Some(model.id.as_str()))
                    .map(|c| parse_uuid(&c.id, "contract"))
                    .collect::<ResultEngine<Vec<_>>>()?;
                records.push(SettlementRecord::try_from((model, relations, contract_ids))?);
            }
            Ok(records)
        })
    }
}
