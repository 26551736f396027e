use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tag naming which concrete product table a cart line points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Notebook,
    Smartphone,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Notebook => "notebook",
            ProductKind::Smartphone => "smartphone",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "notebook" => Some(ProductKind::Notebook),
            "smartphone" => Some(ProductKind::Smartphone),
            _ => None,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            ProductKind::Notebook => "notebooks",
            ProductKind::Smartphone => "smartphones",
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    IsReady,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::IsReady => "is_ready",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(OrderStatus::New),
            "in_progress" => Some(OrderStatus::InProgress),
            "is_ready" => Some(OrderStatus::IsReady),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BuyingType {
    #[serde(rename = "self")]
    SelfPickup,
    Delivery,
}

impl BuyingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuyingType::SelfPickup => "self",
            BuyingType::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "self" => Some(BuyingType::SelfPickup),
            "delivery" => Some(BuyingType::Delivery),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    /// Accumulated balance in minor units. Never debited by this service.
    pub money: i64,
    pub created_at: DateTime<Utc>,
}

/// Prices are minor units (cents); `sale_price` is what the cart charges.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notebook {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Smartphone {
    pub id: Uuid,
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
    pub sd: bool,
    pub hdd: String,
    pub cam: String,
    pub created_at: DateTime<Utc>,
}

/// Kind-agnostic view of a product, used by the latest/category listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub kind: ProductKind,
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub slug: String,
    pub price: i64,
    pub sale_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub anon_token: Option<Uuid>,
    pub total_product: i32,
    pub final_price: i64,
    pub in_order: bool,
    pub for_anon_user: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CartProduct {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub product_kind: String,
    pub product_id: Uuid,
    pub quantity: i32,
    /// quantity x the product's sale_price as of the last save of this line.
    pub final_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub cart_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: String,
    pub buying_type: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub order_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_kind_round_trips_through_tag() {
        assert_eq!(ProductKind::parse("notebook"), Some(ProductKind::Notebook));
        assert_eq!(
            ProductKind::parse("smartphone"),
            Some(ProductKind::Smartphone)
        );
        assert_eq!(ProductKind::parse("category"), None);
        assert_eq!(ProductKind::Notebook.table(), "notebooks");
    }

    #[test]
    fn order_status_admits_exactly_four_values() {
        for s in ["new", "in_progress", "is_ready", "completed"] {
            let parsed = OrderStatus::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn buying_type_serializes_as_self_and_delivery() {
        assert_eq!(
            serde_json::to_string(&BuyingType::SelfPickup).unwrap(),
            "\"self\""
        );
        assert_eq!(BuyingType::parse("delivery"), Some(BuyingType::Delivery));
        assert_eq!(BuyingType::parse("pickup"), None);
    }
}
