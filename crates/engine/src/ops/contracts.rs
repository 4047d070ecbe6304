use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Contract, EngineError, MakeContractCmd, ResultEngine, contract_items, contract_splitters,
    contracts::{self, child_models, load_contracts},
    util::{normalize_optional_text, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a pending contract in a hangout.
    ///
    /// The caller, the payer and every splitter must be participants.
    pub async fn make_contract(&self, cmd: MakeContractCmd) -> ResultEngine<Uuid> {
        let MakeContractCmd {
            hangout_code,
            name,
            description,
            payer,
            splitters,
            total_cost,
            user_id,
        } = cmd;
        let description = normalize_optional_text(description.as_deref());

        let mut contract = Contract::new(hangout_code.as_str(), payer, splitters, total_cost)?
            .name(name.trim())
            .created_by(user_id.as_str());
        contract.description = description;

        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, &hangout_code, &user_id)
                .await?;
            let participants = self.participant_ids(&db_tx, &hangout_code).await?;
            let outsiders = std::iter::once(contract.payer.as_str())
                .chain(
                    contract
                        .splitters
                        .iter()
                        .map(|s| s.participant_id.as_str()),
                )
                .find(|id| !participants.contains(*id));
            if let Some(outsider) = outsiders {
                return Err(EngineError::Validation(format!(
                    "{outsider} is not a participant of hangout {hangout_code}"
                )));
            }

            contracts::ActiveModel::from(&contract)
                .insert(&db_tx)
                .await?;
            let (splitter_models, item_models) = child_models(&contract);
            contract_splitters::Entity::insert_many(splitter_models)
                .exec(&db_tx)
                .await?;
            if !item_models.is_empty() {
                contract_items::Entity::insert_many(item_models)
                    .exec(&db_tx)
                    .await?;
            }

            Ok(contract.id)
        })
    }

    /// Every contract of the hangout, pending and submitted, oldest first.
    pub async fn hangout_contracts(
        &self,
        hangout_code: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Contract>> {
        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, hangout_code, user_id)
                .await?;
            let models = contracts::Entity::find()
                .filter(contracts::Column::HangoutCode.eq(hangout_code))
                .order_by_asc(contracts::Column::CreatedAt)
                .order_by_asc(contracts::Column::Id)
                .all(&db_tx)
                .await?;
            load_contracts(&db_tx, models).await
        })
    }

    /// A single contract of the hangout.
    pub async fn contract(
        &self,
        hangout_code: &str,
        contract_id: &str,
        user_id: &str,
    ) -> ResultEngine<Contract> {
        let contract_id = parse_uuid(contract_id, "contract")?;
        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, hangout_code, user_id)
                .await?;
            let model = contracts::Entity::find_by_id(contract_id.to_string())
                .filter(contracts::Column::HangoutCode.eq(hangout_code))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("contract not exists".to_string()))?;
            let mut loaded = load_contracts(&db_tx, vec![model]).await?;
            loaded
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound("contract not exists".to_string()))
        })
    }
}
