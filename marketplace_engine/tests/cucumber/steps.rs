use chrono::{Duration, Utc};
use cucumber::{given, then, when};
use marketplace_engine::{
    db_types::{Cents, EscrowStatus, NewProduct, OrderStatusType, UserId},
    order_objects::{CartItem, PlaceOrderRequest},
    OrderPlacementError,
    ProductCatalog,
};

use crate::cucumber::{
    market_world::{seller, shipping_for},
    MarketWorld,
};

#[given(expr = "a product {string} priced at {int} with {int} in stock")]
async fn add_product(world: &mut MarketWorld, name: String, price: i64, stock: i64) {
    let product = NewProduct::new(seller(), name.as_str(), Cents::from_units(price), stock);
    let product = world.system().products.create_product(product).await.expect("Error creating product");
    world.products.insert(name, product);
}

#[given(expr = "a product {string} on special at {int} down from {int} that ended {int} days ago")]
async fn add_lapsed_special(world: &mut MarketWorld, name: String, price: i64, old_price: i64, days: i64) {
    let product = NewProduct::new(seller(), name.as_str(), Cents::from_units(price), 10)
        .with_special(Cents::from_units(old_price), Utc::now() - Duration::days(days));
    // Straight to storage, as if the special lapsed while nobody was looking.
    let product = world.system().db.insert_product(product).await.expect("Error inserting product");
    world.products.insert(name, product);
}

#[given(expr = "a product {string} on special at {int} down from {int} for another {int} days")]
async fn add_running_special(world: &mut MarketWorld, name: String, price: i64, old_price: i64, days: i64) {
    let product = NewProduct::new(seller(), name.as_str(), Cents::from_units(price), 10)
        .with_special(Cents::from_units(old_price), Utc::now() + Duration::days(days));
    let product = world.system().products.create_product(product).await.expect("Error creating product");
    world.products.insert(name, product);
}

async fn place_order(world: &mut MarketWorld, customer: &str, items: Vec<CartItem>) {
    let request = PlaceOrderRequest::new(items, shipping_for(customer));
    let result = world.system().orders.place_order(&UserId::from(customer), request).await;
    world.last_order = Some(result);
}

#[when(expr = "customer {word} orders {int} of {string}")]
async fn order_one_line(world: &mut MarketWorld, customer: String, quantity: i64, name: String) {
    let item = CartItem::new(world.product(&name).id.as_str(), quantity);
    place_order(world, &customer, vec![item]).await;
}

#[when(expr = "customer {word} orders {int} of {string} and {int} of {string}")]
async fn order_two_lines(world: &mut MarketWorld, customer: String, q1: i64, name1: String, q2: i64, name2: String) {
    let items =
        vec![CartItem::new(world.product(&name1).id.as_str(), q1), CartItem::new(world.product(&name2).id.as_str(), q2)];
    place_order(world, &customer, items).await;
}

#[when(expr = "customer {word} submits an empty cart")]
async fn order_nothing(world: &mut MarketWorld, customer: String) {
    place_order(world, &customer, vec![]).await;
}

#[when(expr = "the seller marks the order as {word}")]
async fn seller_updates_order(world: &mut MarketWorld, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let id = world.placed_order().id.to_string();
    let tracking = (status == OrderStatusType::Shipped).then(|| "TRACK-0001".to_string());
    let order = world
        .system()
        .queries
        .update_status_for_seller(&seller(), &id, status, tracking)
        .await
        .expect("Error updating order status");
    world.last_order = Some(Ok(order));
}

#[then(expr = "the order is placed with a total of {int}")]
async fn order_total(world: &mut MarketWorld, total: i64) {
    let order = world.placed_order();
    assert_eq!(order.total_amount, Cents::from_units(total));
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.escrow_status, EscrowStatus::Held);
}

#[then(expr = "the order is rejected for insufficient stock of {string}")]
async fn rejected_for_stock(world: &mut MarketWorld, name: String) {
    match &world.last_order {
        Some(Err(OrderPlacementError::InsufficientStock { name: n, .. })) => assert_eq!(n, &name),
        other => panic!("Expected an insufficient stock rejection, got {other:?}"),
    }
}

#[then("the order is rejected because the cart is empty")]
async fn rejected_empty(world: &mut MarketWorld) {
    assert!(matches!(world.last_order, Some(Err(OrderPlacementError::EmptyCart))));
}

#[then(expr = "{string} has {int} in stock")]
async fn check_stock(world: &mut MarketWorld, name: String, stock: i64) {
    let id = world.product(&name).id.clone();
    let product = world.system().db.fetch_product(&id).await.expect("Error fetching product").expect("Missing product");
    assert_eq!(product.stock, stock);
}

#[then(expr = "customer {word} has {int} orders")]
async fn count_orders(world: &mut MarketWorld, customer: String, count: usize) {
    let orders =
        world.system().queries.orders_for_customer(&UserId::from(customer)).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

#[then(expr = "the shop lists {string} at {int}")]
async fn shop_price(world: &mut MarketWorld, name: String, price: i64) {
    let listed = world.system().products.shop_products().await.expect("Error fetching shop listing");
    let product = listed.iter().find(|p| p.name == name).unwrap_or_else(|| panic!("{name} is not listed"));
    assert_eq!(product.price, Cents::from_units(price));
}

#[then(expr = "{string} is not on special")]
async fn not_on_special(world: &mut MarketWorld, name: String) {
    let id = world.product(&name).id.clone();
    let product = world.system().db.fetch_product(&id).await.expect("Error fetching product").expect("Missing product");
    assert!(!product.on_special);
    assert!(product.special_end.is_none());
    assert_eq!(product.old_price, Cents::default());
}

#[then(expr = "{string} is still on special")]
async fn still_on_special(world: &mut MarketWorld, name: String) {
    let id = world.product(&name).id.clone();
    let product = world.system().db.fetch_product(&id).await.expect("Error fetching product").expect("Missing product");
    assert!(product.on_special);
}

#[then(expr = "the order is {word} with escrow {word}")]
async fn order_state(world: &mut MarketWorld, status: String, escrow: String) {
    let order = world.placed_order();
    assert_eq!(order.status.to_string(), status);
    assert_eq!(order.escrow_status.to_string(), escrow);
}
