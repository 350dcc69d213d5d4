use serde::{Deserialize, Serialize};

use crate::db_types::{Cents, Order, OrderStatusType, Product, Seller};

/// A new order was placed and its stock reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub old_status: OrderStatusType,
    pub order: Order,
}

impl OrderStatusChangedEvent {
    pub fn new(old_status: OrderStatusType, order: Order) -> Self {
        Self { old_status, order }
    }
}

/// A lapsed special was found on read and the product reverted to its regular price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialPriceExpiredEvent {
    pub special_price: Cents,
    pub product: Product,
}

impl SpecialPriceExpiredEvent {
    pub fn new(special_price: Cents, product: Product) -> Self {
        Self { special_price, product }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerLockedEvent {
    pub seller: Seller,
}

impl SellerLockedEvent {
    pub fn new(seller: Seller) -> Self {
        Self { seller }
    }
}
