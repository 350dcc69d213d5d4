#![allow(dead_code)]
use chrono::{Duration, Utc};
use marketplace_engine::{
    db_types::{Cents, NewProduct, Product, ShippingDetails, UserId},
    events::EventProducers,
    order_objects::{CartItem, PlaceOrderRequest, PricingPolicy},
    test_utils::prepare_env::fresh_database,
    OrderPlacementApi,
    ProductCatalog,
    SqliteDatabase,
};

pub async fn setup() -> (SqliteDatabase, OrderPlacementApi<SqliteDatabase>) {
    let db = fresh_database().await;
    let api = OrderPlacementApi::new(db.clone(), PricingPolicy::default(), EventProducers::default());
    (db, api)
}

pub fn seller() -> UserId {
    UserId::from("seller-nomsa")
}

pub fn customer() -> UserId {
    UserId::from("customer-pieter")
}

pub fn shipping() -> ShippingDetails {
    ShippingDetails {
        name: "Pieter van Wyk".into(),
        email: "pieter@students.example.edu".into(),
        phone: Some("+27 21 555 0101".into()),
        address: "Room 14, Huis Visser".into(),
        city: "Stellenbosch".into(),
    }
}

pub fn cart(items: &[(&Product, i64)]) -> PlaceOrderRequest {
    let items = items.iter().map(|(p, q)| CartItem::new(p.id.as_str(), *q)).collect();
    PlaceOrderRequest::new(items, shipping())
}

pub async fn add_product(db: &SqliteDatabase, name: &str, price: Cents, stock: i64) -> Product {
    db.insert_product(NewProduct::new(seller(), name, price, stock)).await.expect("Error inserting product")
}

/// A product whose special ended a day ago, but has not been reconciled yet.
pub async fn add_lapsed_special(db: &SqliteDatabase, price: Cents, old_price: Cents, stock: i64) -> Product {
    let product = NewProduct::new(seller(), "Graphing calculator", price, stock)
        .with_special(old_price, Utc::now() - Duration::days(1));
    db.insert_product(product).await.expect("Error inserting product")
}

pub async fn stock_of(db: &SqliteDatabase, product: &Product) -> i64 {
    db.fetch_product(&product.id).await.expect("Error fetching product").expect("Product should exist").stock
}
