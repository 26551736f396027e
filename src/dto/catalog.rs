use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, ProductSummary, Seller};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSellerRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNotebookRequest {
    pub category_id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub sale_price: i64,
    pub diagonal: String,
    pub display: String,
    pub ram: String,
    pub video: String,
    pub hdd: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSmartphoneRequest {
    pub category_id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub sale_price: i64,
    pub diagonal: String,
    pub display: String,
    pub accum: String,
    #[serde(default = "default_sd")]
    pub sd: bool,
    pub hdd: String,
    pub cam: String,
}

fn default_sd() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithProducts {
    pub category: Category,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerList {
    pub items: Vec<Seller>,
}
