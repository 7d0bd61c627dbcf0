use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub details: Option<String>,
    pub region: Option<String>,
    pub price: f64,
    pub cover: Option<String>,
    pub sold: bool,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub created_at: String,
    pub account_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    #[sea_orm(has_many = "super::image::Entity")]
    Images,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        super::wishlist_book::Relation::Wishlist.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::wishlist_book::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Read model for API responses: the persisted listing plus its images.
#[derive(Debug, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub details: Option<String>,
    pub region: Option<String>,
    pub price: f64,
    pub cover: Option<String>,
    pub sold: bool,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub created_at: String,
    pub account: i32,
    pub images: Vec<super::image::Image>,
}

impl Book {
    pub fn from_model(model: Model, images: Vec<super::image::Model>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            details: model.details,
            region: model.region,
            price: model.price,
            cover: model.cover,
            sold: model.sold,
            phone: model.phone,
            telegram: model.telegram,
            created_at: model.created_at,
            account: model.account_id,
            images: images.into_iter().map(super::image::Image::from).collect(),
        }
    }
}

/// Write model for creation. The owner is never part of the payload; it is
/// always the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct BookCreate {
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub sold: Option<bool>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// Write model for updates. All fields optional; `account` is not settable.
#[derive(Debug, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub sold: Option<bool>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}
