//! Product entity (product-seller catalog items).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub about: Option<String>,

    #[sea_orm(nullable)]
    pub category: Option<String>,

    #[sea_orm(nullable)]
    pub subcategory: Option<String>,

    #[sea_orm(nullable)]
    pub product_type: Option<String>,

    #[sea_orm(nullable)]
    pub subtype: Option<String>,

    /// List price in rupees.
    pub price: i64,

    /// Flat discount in rupees; the effective price is `price - discount_price`.
    #[sea_orm(nullable)]
    pub discount_price: Option<i64>,

    #[sea_orm(nullable)]
    pub brand_id: Option<String>,

    /// Owning product seller.
    pub created_by: String,

    /// Number of live flags against this product.
    #[sea_orm(default_value = 0)]
    pub flag_count: i32,

    /// Set when the flag count reaches the moderation threshold.
    #[sea_orm(default_value = false)]
    pub is_violated: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Effective price after the flat discount.
    #[must_use]
    pub fn last_price(&self) -> i64 {
        self.price - self.discount_price.unwrap_or(0)
    }
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

    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "SetNull"
    )]
    Brand,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(price: i64, discount: Option<i64>) -> Model {
        Model {
            id: "p1".to_string(),
            name: "Teak door".to_string(),
            about: None,
            category: None,
            subcategory: None,
            product_type: None,
            subtype: None,
            price,
            discount_price: discount,
            brand_id: None,
            created_by: "u1".to_string(),
            flag_count: 0,
            is_violated: false,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_last_price_applies_discount() {
        assert_eq!(sample(1000, Some(150)).last_price(), 850);
    }

    #[test]
    fn test_last_price_without_discount() {
        assert_eq!(sample(1000, None).last_price(), 1000);
    }
}
