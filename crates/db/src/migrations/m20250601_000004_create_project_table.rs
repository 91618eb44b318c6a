//! Create project table migration.

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
                    .table(Project::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Project::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Project::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Project::ProjectType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Project::ConstructionType)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(Project::Style).string_len(64).null())
                    .col(ColumnDef::new(Project::Place).string_len(256).null())
                    .col(ColumnDef::new(Project::AreaSqft).integer().null())
                    .col(ColumnDef::new(Project::Cost).big_integer().null())
                    .col(ColumnDef::new(Project::About).text().null())
                    .col(
                        ColumnDef::new(Project::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Project::FlagCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Project::IsViolated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Project::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Project::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_owner")
                            .from(Project::Table, Project::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_by (owner listings and the aggregator's join phase)
        manager
            .create_index(
                Index::create()
                    .name("idx_project_created_by")
                    .table(Project::Table)
                    .col(Project::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Index: is_violated (public listings exclude violated projects)
        manager
            .create_index(
                Index::create()
                    .name("idx_project_is_violated")
                    .table(Project::Table)
                    .col(Project::IsViolated)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Project {
    Table,
    Id,
    Title,
    ProjectType,
    ConstructionType,
    Style,
    Place,
    AreaSqft,
    Cost,
    About,
    CreatedBy,
    FlagCount,
    IsViolated,
    CreatedAt,
    UpdatedAt,
}
