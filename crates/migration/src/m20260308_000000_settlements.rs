//! Settlement log: one row per accepted submission plus its relations.

use sea_orm_migration::prelude::*;

use crate::m20260301_000000_init::{Contracts, Hangouts};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Settlements {
    Table,
    Id,
    HangoutCode,
    SubmittedBy,
    SubmittedAt,
    Strategy,
}

#[derive(Iden)]
enum SettlementRelations {
    Table,
    SettlementId,
    Position,
    Creditor,
    Debtor,
    Amount,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settlements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settlements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settlements::HangoutCode).string().not_null())
                    .col(ColumnDef::new(Settlements::SubmittedBy).string().not_null())
                    .col(
                        ColumnDef::new(Settlements::SubmittedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settlements::Strategy)
                            .string()
                            .not_null()
                            .default("pairwise"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-settlements-hangout_code")
                            .from(Settlements::Table, Settlements::HangoutCode)
                            .to(Hangouts::Table, Hangouts::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-settlements-hangout_code-submitted_at")
                    .table(Settlements::Table)
                    .col(Settlements::HangoutCode)
                    .col(Settlements::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SettlementRelations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SettlementRelations::SettlementId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SettlementRelations::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SettlementRelations::Creditor)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SettlementRelations::Debtor).string().not_null())
                    .col(
                        ColumnDef::new(SettlementRelations::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SettlementRelations::SettlementId)
                            .col(SettlementRelations::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-settlement_relations-settlement_id")
                            .from(SettlementRelations::Table, SettlementRelations::SettlementId)
                            .to(Settlements::Table, Settlements::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // SQLite cannot add a foreign key to an existing table; the link from
        // contracts is an indexed column only.
        manager
            .create_index(
                Index::create()
                    .name("idx-contracts-settlement_id")
                    .table(Contracts::Table)
                    .col(Contracts::SettlementId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-contracts-settlement_id")
                    .table(Contracts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(SettlementRelations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settlements::Table).to_owned())
            .await?;
        Ok(())
    }
}
