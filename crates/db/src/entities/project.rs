//! Professional project entity (realtor/professional portfolio listings).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// e.g. "residential", "commercial"
    pub project_type: String,

    #[sea_orm(nullable)]
    pub construction_type: Option<String>,

    /// Architectural style, e.g. "contemporary"
    #[sea_orm(nullable)]
    pub style: Option<String>,

    /// Town/locality of the site.
    #[sea_orm(nullable)]
    pub place: Option<String>,

    /// Built-up area in square feet.
    #[sea_orm(nullable)]
    pub area_sqft: Option<i32>,

    /// Project cost in rupees.
    #[sea_orm(nullable)]
    pub cost: Option<i64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub about: Option<String>,

    /// Owning realtor/professional.
    pub created_by: String,

    /// Number of live flags against this project.
    #[sea_orm(default_value = 0)]
    pub flag_count: i32,

    /// Set when the flag count reaches the moderation threshold.
    #[sea_orm(default_value = false)]
    pub is_violated: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
