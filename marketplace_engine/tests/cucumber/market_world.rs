use std::collections::HashMap;

use cucumber::World;
use log::*;
use marketplace_engine::{
    db_types::{Order, Product, ShippingDetails, UserId},
    events::EventProducers,
    order_objects::PricingPolicy,
    test_utils::prepare_env::{create_migrated_database, random_db_url},
    OrderPlacementApi,
    OrderPlacementError,
    OrderQueryApi,
    ProductApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct MarketWorld {
    pub system: Option<MarketplaceSystem>,
    /// Products created in the scenario, by name.
    pub products: HashMap<String, Product>,
    pub last_order: Option<Result<Order, OrderPlacementError>>,
}

#[derive(Debug)]
pub struct MarketplaceSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub products: ProductApi<SqliteDatabase>,
    pub orders: OrderPlacementApi<SqliteDatabase>,
    pub queries: OrderQueryApi<SqliteDatabase>,
}

impl MarketWorld {
    pub fn system(&self) -> &MarketplaceSystem {
        self.system.as_ref().expect("Marketplace not initialised. Start the scenario with 'Given a fresh install'")
    }

    pub fn product(&self, name: &str) -> &Product {
        self.products.get(name).unwrap_or_else(|| panic!("No product called '{name}' in this scenario"))
    }

    pub fn placed_order(&self) -> &Order {
        match &self.last_order {
            Some(Ok(order)) => order,
            Some(Err(e)) => panic!("The last order was rejected: {e}"),
            None => panic!("No order has been placed"),
        }
    }
}

impl MarketplaceSystem {
    pub async fn new() -> Self {
        let url = random_db_url();
        let db = create_migrated_database(&url).await;
        debug!("🚀️ Marketplace started on {url}");
        let producers = EventProducers::default();
        let products = ProductApi::new(db.clone(), producers.clone());
        let orders = OrderPlacementApi::new(db.clone(), PricingPolicy::default(), producers.clone());
        let queries = OrderQueryApi::new(db.clone(), producers);
        Self { db_path: url, db, products, orders, queries }
    }
}

pub fn seller() -> UserId {
    UserId::from("seller-thandi")
}

pub fn shipping_for(customer: &str) -> ShippingDetails {
    ShippingDetails {
        name: customer.to_string(),
        email: format!("{customer}@students.example.edu"),
        phone: None,
        address: "12 Library Road".into(),
        city: "Grahamstown".into(),
    }
}
