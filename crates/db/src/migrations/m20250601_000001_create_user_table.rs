//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(User::PhoneNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::Fname).string_len(128).null())
                    .col(ColumnDef::new(User::Lname).string_len(128).null())
                    .col(ColumnDef::new(User::Email).string_len(256).null())
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(32)
                            .not_null()
                            .default("home_owner"),
                    )
                    .col(ColumnDef::new(User::ProfileImage).string().null())
                    .col(ColumnDef::new(User::Place).string_len(256).null())
                    .col(ColumnDef::new(User::CompanyName).string_len(256).null())
                    .col(ColumnDef::new(User::CompanyEmail).string_len(256).null())
                    .col(ColumnDef::new(User::CompanyPhone).string_len(20).null())
                    .col(ColumnDef::new(User::CompanyGstNumber).string_len(32).null())
                    .col(ColumnDef::new(User::CompanyPlace).string_len(256).null())
                    .col(ColumnDef::new(User::CompanyBio).text().null())
                    .col(ColumnDef::new(User::ExperienceYears).integer().null())
                    .col(
                        ColumnDef::new(User::Token)
                            .string_len(64)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::OtpHash).string().null())
                    .col(
                        ColumnDef::new(User::OtpExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(User::FlagCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(User::IsViolated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: role (directory listings filter by role)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role")
                    .table(User::Table)
                    .col(User::Role)
                    .to_owned(),
            )
            .await?;

        // Index: is_violated (every public listing excludes violated users)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_is_violated")
                    .table(User::Table)
                    .col(User::IsViolated)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    PhoneNumber,
    Fname,
    Lname,
    Email,
    Role,
    ProfileImage,
    Place,
    CompanyName,
    CompanyEmail,
    CompanyPhone,
    CompanyGstNumber,
    CompanyPlace,
    CompanyBio,
    ExperienceYears,
    Token,
    OtpHash,
    OtpExpiresAt,
    FlagCount,
    IsViolated,
    CreatedAt,
    UpdatedAt,
}
