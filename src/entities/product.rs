use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key, assigned by the store on insert
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Product name
    pub name: Option<String>,

    /// Product description
    pub description: Option<String>,

    /// Product brand
    pub brand: Option<String>,

    /// Product category
    pub category: Option<String>,

    /// Product price (fixed-precision, never floating point)
    pub price: Option<Decimal>,

    /// Release date
    pub release_date: Option<NaiveDate>,

    /// Is the product available
    pub available: bool,

    /// Stock quantity
    pub quantity: i32,

    /// File name of the attached image
    pub image_name: Option<String>,

    /// MIME type of the attached image
    pub image_type: Option<String>,

    /// Raw bytes of the attached image
    #[sea_orm(column_type = "Blob", nullable)]
    pub image_data: Option<Vec<u8>>,
}

/// Product entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
