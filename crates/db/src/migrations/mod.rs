//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_category_table;
mod m20250601_000003_create_brand_table;
mod m20250601_000004_create_project_table;
mod m20250601_000005_create_post_table;
mod m20250601_000006_create_product_table;
mod m20250601_000007_create_user_block_table;
mod m20250601_000008_create_flag_table;
mod m20250601_000009_create_order_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_category_table::Migration),
            Box::new(m20250601_000003_create_brand_table::Migration),
            Box::new(m20250601_000004_create_project_table::Migration),
            Box::new(m20250601_000005_create_post_table::Migration),
            Box::new(m20250601_000006_create_product_table::Migration),
            Box::new(m20250601_000007_create_user_block_table::Migration),
            Box::new(m20250601_000008_create_flag_table::Migration),
            Box::new(m20250601_000009_create_order_table::Migration),
        ]
    }
}
