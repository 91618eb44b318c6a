//! Create product table migration.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_user_table::User;
use super::m20250601_000003_create_brand_table::Brand;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Product::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Product::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Product::About).text().null())
                    .col(ColumnDef::new(Product::Category).string_len(128).null())
                    .col(ColumnDef::new(Product::Subcategory).string_len(128).null())
                    .col(ColumnDef::new(Product::ProductType).string_len(128).null())
                    .col(ColumnDef::new(Product::Subtype).string_len(128).null())
                    .col(ColumnDef::new(Product::Price).big_integer().not_null())
                    .col(ColumnDef::new(Product::DiscountPrice).big_integer().null())
                    .col(ColumnDef::new(Product::BrandId).string_len(32).null())
                    .col(
                        ColumnDef::new(Product::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Product::FlagCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Product::IsViolated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Product::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Product::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_owner")
                            .from(Product::Table, Product::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_brand")
                            .from(Product::Table, Product::BrandId)
                            .to(Brand::Table, Brand::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_by (seller catalogs and the aggregator's join phase)
        manager
            .create_index(
                Index::create()
                    .name("idx_product_created_by")
                    .table(Product::Table)
                    .col(Product::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Index: category (catalog listings narrow by category)
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category")
                    .table(Product::Table)
                    .col(Product::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Product::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Product {
    Table,
    Id,
    Name,
    About,
    Category,
    Subcategory,
    ProductType,
    Subtype,
    Price,
    DiscountPrice,
    BrandId,
    CreatedBy,
    FlagCount,
    IsViolated,
    CreatedAt,
    UpdatedAt,
}
