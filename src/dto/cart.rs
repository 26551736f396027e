use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductKind;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_kind: ProductKind,
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// A cart line joined with the product it points at.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product_kind: ProductKind,
    pub product_id: Uuid,
    pub title: String,
    pub slug: String,
    pub sale_price: i64,
    pub quantity: i32,
    pub final_price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartDto {
    pub id: Uuid,
    pub total_product: i32,
    pub final_price: i64,
    pub in_order: bool,
    pub for_anon_user: bool,
    pub items: Vec<CartItemDto>,
}
