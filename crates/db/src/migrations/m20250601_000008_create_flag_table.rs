//! Create flag table migration.

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
                    .table(Flag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Flag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Flag::TargetType).string_len(16).not_null())
                    .col(ColumnDef::new(Flag::TargetId).string_len(32).not_null())
                    .col(ColumnDef::new(Flag::FlaggedBy).string_len(32).not_null())
                    .col(ColumnDef::new(Flag::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Flag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flag_reporter")
                            .from(Flag::Table, Flag::FlaggedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one flag per (actor, target) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_flag_actor_target")
                    .table(Flag::Table)
                    .col(Flag::FlaggedBy)
                    .col(Flag::TargetType)
                    .col(Flag::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (target_type, target_id) for per-entity flag listings
        manager
            .create_index(
                Index::create()
                    .name("idx_flag_target")
                    .table(Flag::Table)
                    .col(Flag::TargetType)
                    .col(Flag::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Flag::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Flag {
    Table,
    Id,
    TargetType,
    TargetId,
    FlaggedBy,
    Reason,
    CreatedAt,
}
