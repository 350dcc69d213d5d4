use std::fmt::Display;

use chrono::{DateTime, Utc};
use marketplace_engine::db_types::{Category, Cents, NewProduct, OrderStatusType, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Body of `POST /api/seller/products`. The seller is always the caller, never a field of the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Cents,
    pub stock: i64,
    #[serde(default)]
    pub category: Category,
    pub image: Option<String>,
    #[serde(default)]
    pub on_special: bool,
    #[serde(default)]
    pub old_price: Cents,
    pub special_end: Option<DateTime<Utc>>,
}

impl NewProductRequest {
    pub fn into_new_product(self, seller: UserId) -> NewProduct {
        let mut product = NewProduct::new(seller, self.name, self.price, self.stock)
            .with_description(self.description)
            .with_category(self.category);
        if let Some(image) = self.image {
            product = product.with_image(image);
        }
        product.on_special = self.on_special;
        product.old_price = self.old_price;
        product.special_end = self.special_end;
        product
    }
}

/// Body of `PUT /api/seller/orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusRequest {
    pub status: OrderStatusType,
    pub tracking_number: Option<String>,
}
