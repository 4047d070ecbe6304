//! Initial schema: users, hangouts and contracts.
//!
//! - `users`: authentication
//! - `hangouts`: groups contracts are settled in, addressed by code
//! - `hangout_participants`: who belongs to a hangout
//! - `contracts`: bill headers (payer, declared total, pending/submitted)
//! - `contract_splitters`: who owes a share of a contract
//! - `contract_items`: itemized prices of each share

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
pub(crate) enum Hangouts {
    Table,
    Code,
    Name,
    Description,
    Owner,
    CreatedAt,
}

#[derive(Iden)]
enum HangoutParticipants {
    Table,
    HangoutCode,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
pub(crate) enum Contracts {
    Table,
    Id,
    HangoutCode,
    Name,
    Description,
    Payer,
    TotalCost,
    Status,
    CreatedBy,
    CreatedAt,
    SettlementId,
    SubmittedAt,
}

#[derive(Iden)]
enum ContractSplitters {
    Table,
    ContractId,
    Position,
    UserId,
}

#[derive(Iden)]
enum ContractItems {
    Table,
    ContractId,
    SplitterPosition,
    Position,
    Name,
    Price,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Hangouts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Hangouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hangouts::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hangouts::Name).string().not_null())
                    .col(ColumnDef::new(Hangouts::Description).string())
                    .col(ColumnDef::new(Hangouts::Owner).string().not_null())
                    .col(ColumnDef::new(Hangouts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-hangouts-owner")
                            .from(Hangouts::Table, Hangouts::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Hangout participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(HangoutParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HangoutParticipants::HangoutCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HangoutParticipants::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HangoutParticipants::JoinedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(HangoutParticipants::HangoutCode)
                            .col(HangoutParticipants::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-hangout_participants-hangout_code")
                            .from(HangoutParticipants::Table, HangoutParticipants::HangoutCode)
                            .to(Hangouts::Table, Hangouts::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-hangout_participants-user_id")
                            .from(HangoutParticipants::Table, HangoutParticipants::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-hangout_participants-user_id")
                    .table(HangoutParticipants::Table)
                    .col(HangoutParticipants::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Contracts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contracts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contracts::HangoutCode).string().not_null())
                    .col(ColumnDef::new(Contracts::Name).string().not_null())
                    .col(ColumnDef::new(Contracts::Description).string())
                    .col(ColumnDef::new(Contracts::Payer).string().not_null())
                    .col(
                        ColumnDef::new(Contracts::TotalCost)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Contracts::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Contracts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Contracts::SettlementId).string())
                    .col(ColumnDef::new(Contracts::SubmittedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contracts-hangout_code")
                            .from(Contracts::Table, Contracts::HangoutCode)
                            .to(Hangouts::Table, Hangouts::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contracts-hangout_code-status")
                    .table(Contracts::Table)
                    .col(Contracts::HangoutCode)
                    .col(Contracts::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Contract splitters
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ContractSplitters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractSplitters::ContractId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractSplitters::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractSplitters::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ContractSplitters::ContractId)
                            .col(ContractSplitters::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contract_splitters-contract_id")
                            .from(ContractSplitters::Table, ContractSplitters::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Contract items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ContractItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ContractItems::ContractId).string().not_null())
                    .col(
                        ColumnDef::new(ContractItems::SplitterPosition)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractItems::Position).integer().not_null())
                    .col(ColumnDef::new(ContractItems::Name).string().not_null())
                    .col(ColumnDef::new(ContractItems::Price).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ContractItems::ContractId)
                            .col(ContractItems::SplitterPosition)
                            .col(ContractItems::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contract_items-contract_id")
                            .from(ContractItems::Table, ContractItems::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ContractItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContractSplitters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HangoutParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hangouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
