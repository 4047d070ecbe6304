//! Relations recorded by a settlement (`creditor` is owed `amount` by `debtor`).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlement_relations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub settlement_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub position: i32,
    pub creditor: String,
    pub debtor: String,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::settlements::Entity",
        from = "Column::SettlementId",
        to = "super::settlements::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Settlements,
}

impl Related<super::settlements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
