//! Moderation flag entity.
//!
//! Flags are append-only report records. A given user may flag a given
//! target at most once; the `(flagged_by, target_type, target_id)` unique
//! index backs that rule at the storage layer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of entity a flag points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum FlagTargetType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "project")]
    Project,
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "product")]
    Product,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub target_type: FlagTargetType,

    /// Id of the flagged entity.
    pub target_id: String,

    /// The user who raised the flag.
    pub flagged_by: String,

    /// Reason given by the reporter.
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FlaggedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl ActiveModelBehavior for ActiveModel {}
