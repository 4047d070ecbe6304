//! Contract persistence.
//!
//! A contract is stored across three tables: the header (`contracts`), one
//! row per splitter (`contract_splitters`) and one row per item
//! (`contract_items`). Positions keep the client's ordering.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{
    Amount, Contract, ContractStatus, EngineError, Item, ResultEngine, Splitter,
    contract_items, contract_splitters, util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub hangout_code: String,
    pub name: String,
    pub description: Option<String>,
    pub payer: String,
    pub total_cost: i64,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub settlement_id: Option<String>,
    pub submitted_at: Option<DateTimeUtc>,
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
    #[sea_orm(has_many = "super::contract_splitters::Entity")]
    Splitters,
    #[sea_orm(has_many = "super::contract_items::Entity")]
    Items,
}

impl Related<super::hangouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hangouts.def()
    }
}

impl Related<super::contract_splitters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splitters.def()
    }
}

impl Related<super::contract_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Contract> for ActiveModel {
    fn from(contract: &Contract) -> Self {
        Self {
            id: ActiveValue::Set(contract.id.to_string()),
            hangout_code: ActiveValue::Set(contract.hangout_code.clone()),
            name: ActiveValue::Set(contract.name.clone()),
            description: ActiveValue::Set(contract.description.clone()),
            payer: ActiveValue::Set(contract.payer.clone()),
            total_cost: ActiveValue::Set(contract.total_cost.minor()),
            status: ActiveValue::Set(contract.status.as_str().to_string()),
            created_by: ActiveValue::Set(contract.created_by.clone()),
            created_at: ActiveValue::Set(contract.created_at),
            settlement_id: ActiveValue::Set(contract.settlement_id.map(|id| id.to_string())),
            submitted_at: ActiveValue::NotSet,
        }
    }
}

/// Rows for the splitters and items of `contract`, in positional order.
pub(crate) fn child_models(
    contract: &Contract,
) -> (
    Vec<contract_splitters::ActiveModel>,
    Vec<contract_items::ActiveModel>,
) {
    let contract_id = contract.id.to_string();
    let mut splitters = Vec::with_capacity(contract.splitters.len());
    let mut items = Vec::new();
    for (splitter_position, splitter) in contract.splitters.iter().enumerate() {
        let splitter_position = splitter_position as i32;
        splitters.push(contract_splitters::ActiveModel {
            contract_id: ActiveValue::Set(contract_id.clone()),
            position: ActiveValue::Set(splitter_position),
            user_id: ActiveValue::Set(splitter.participant_id.clone()),
        });
        for (position, item) in splitter.items.iter().enumerate() {
            items.push(contract_items::ActiveModel {
                contract_id: ActiveValue::Set(contract_id.clone()),
                splitter_position: ActiveValue::Set(splitter_position),
                position: ActiveValue::Set(position as i32),
                name: ActiveValue::Set(item.name.clone()),
                price: ActiveValue::Set(item.price.minor()),
            });
        }
    }
    (splitters, items)
}

impl
    TryFrom<(
        Model,
        Vec<contract_splitters::Model>,
        Vec<contract_items::Model>,
    )> for Contract
{
    type Error = EngineError;

    /// Rebuilds a contract from its rows and re-validates it, so corrupted
    /// rows surface as a validation error instead of a wrong settlement.
    fn try_from(
        (model, mut splitter_models, mut item_models): (
            Model,
            Vec<contract_splitters::Model>,
            Vec<contract_items::Model>,
        ),
    ) -> Result<Self, Self::Error> {
        splitter_models.sort_by_key(|s| s.position);
        item_models.sort_by_key(|i| (i.splitter_position, i.position));

        let mut splitters: Vec<Splitter> = splitter_models
            .into_iter()
            .map(|s| Splitter {
                participant_id: s.user_id,
                items: Vec::new(),
            })
            .collect();
        for item in item_models {
            let splitter = usize::try_from(item.splitter_position)
                .ok()
                .and_then(|idx| splitters.get_mut(idx))
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "contract {} has an item without splitter",
                        model.id
                    ))
                })?;
            splitter.items.push(Item {
                name: item.name,
                price: Amount::new(item.price),
            });
        }

        let contract = Self {
            id: parse_uuid(&model.id, "contract")?,
            hangout_code: model.hangout_code,
            name: model.name,
            description: model.description,
            payer: model.payer,
            splitters,
            total_cost: Amount::new(model.total_cost),
            status: ContractStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
            settlement_id: model
                .settlement_id
                .as_deref()
                .map(|id| parse_uuid(id, "settlement"))
                .transpose()?,
        };
        contract.validate()?;
        Ok(contract)
    }
}

/// Loads whole contracts for the given header rows.
pub(crate) async fn load_contracts<C>(db: &C, models: Vec<Model>) -> ResultEngine<Vec<Contract>>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let splitter_models = contract_splitters::Entity::find()
        .filter(contract_splitters::Column::ContractId.is_in(ids.clone()))
        .all(db)
        .await?;
    let item_models = contract_items::Entity::find()
        .filter(contract_items::Column::ContractId.is_in(ids))
        .all(db)
        .await?;

    models
        .into_iter()
        .map(|model| {
            let splitters = splitter_models
                .iter()
                .filter(|s| s.contract_id == model.id)
                .cloned()
                .collect();
            let items = item_models
                .iter()
                .filter(|i| i.contract_id == model.id)
                .cloned()
                .collect();
            Contract::try_from((model, splitters, items))
        })
        .collect()
}
