use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::cart::CartItemDto, models::Order};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MakeOrderRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    /// "self" or "delivery"; defaults to self-pickup.
    pub buying_type: Option<String>,
    pub comment: Option<String>,
    /// Requested fulfillment date; defaults to today.
    pub order_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<CartItemDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
