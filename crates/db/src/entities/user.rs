//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marketplace role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum UserRole {
    #[sea_orm(string_value = "home_owner")]
    #[default]
    HomeOwner,
    #[sea_orm(string_value = "realtor")]
    Realtor,
    #[sea_orm(string_value = "professional")]
    Professional,
    #[sea_orm(string_value = "product_seller")]
    ProductSeller,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Roles whose profiles carry portfolio projects.
    #[must_use]
    pub const fn has_projects(self) -> bool {
        matches!(self, Self::Realtor | Self::Professional)
    }

    /// Roles whose profiles carry products.
    #[must_use]
    pub const fn has_products(self) -> bool {
        matches!(self, Self::ProductSeller)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login identity; OTPs are delivered here.
    #[sea_orm(unique)]
    pub phone_number: String,

    #[sea_orm(nullable)]
    pub fname: Option<String>,

    #[sea_orm(nullable)]
    pub lname: Option<String>,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    pub role: UserRole,

    #[sea_orm(nullable)]
    pub profile_image: Option<String>,

    /// Town/locality of the user.
    #[sea_orm(nullable)]
    pub place: Option<String>,

    // Company details (realtors, professionals and product sellers)
    #[sea_orm(nullable)]
    pub company_name: Option<String>,

    #[sea_orm(nullable)]
    pub company_email: Option<String>,

    #[sea_orm(nullable)]
    pub company_phone: Option<String>,

    #[sea_orm(nullable)]
    pub company_gst_number: Option<String>,

    #[sea_orm(nullable)]
    pub company_place: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub company_bio: Option<String>,

    /// Years of experience claimed on the company profile.
    #[sea_orm(nullable)]
    pub experience_years: Option<i32>,

    /// Opaque bearer token; rotated on every OTP login.
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Argon2 hash of the last issued OTP.
    #[sea_orm(nullable)]
    pub otp_hash: Option<String>,

    #[sea_orm(nullable)]
    pub otp_expires_at: Option<DateTimeWithTimeZone>,

    /// Number of live flags against this user.
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
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::product::Entity")]
    Products,

    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
