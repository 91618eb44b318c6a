//! Create user block table migration.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserBlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserBlock::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserBlock::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(UserBlock::BlockedId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserBlock::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_block_blocker")
                            .from(UserBlock::Table, UserBlock::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_block_blocked")
                            .from(UserBlock::Table, UserBlock::BlockedId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, blocked_id) - prevent duplicate blocks
        manager
            .create_index(
                Index::create()
                    .name("idx_user_block_pair")
                    .table(UserBlock::Table)
                    .col(UserBlock::UserId)
                    .col(UserBlock::BlockedId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (block-list lookups for the visibility filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_block_user_id")
                    .table(UserBlock::Table)
                    .col(UserBlock::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBlock::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserBlock {
    Table,
    Id,
    UserId,
    BlockedId,
    CreatedAt,
}
