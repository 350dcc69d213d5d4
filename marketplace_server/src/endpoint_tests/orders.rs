use actix_web::{
    http::{header::CONTENT_TYPE, StatusCode},
    test::TestRequest,
};
use marketplace_engine::{
    db_types::{Cents, NewOrder, OrderItem, Role, UserId},
    traits::OrderManagementError,
};
use mockall::predicate::eq;
use serde_json::json;

use super::helpers::*;

fn checkout(quantity: i64) -> TestRequest {
    TestRequest::post().uri("/api/orders").insert_header(bearer(CUSTOMER, Role::Customer)).set_json(json!({
        "items": [{"product": PRODUCT_ID, "quantity": quantity}],
        "shippingDetails": shipping(),
    }))
}

#[actix_web::test]
async fn valid_order_is_created_with_the_server_total() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().times(1).returning(|_| Ok(Some(product(PRODUCT_ID, 10_000, 5))));
    backends
        .placement
        .expect_insert_order_and_reserve_stock()
        .withf(|o: &NewOrder| o.customer_id.as_str() == CUSTOMER && o.total_amount == Cents::from(26_600))
        .times(1)
        .returning(|o| Ok(order_from(o)));
    let (status, body) = send(checkout(2), backends).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = json(&body);
    assert_eq!(order["totalAmount"], 266.0);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["escrowStatus"], "Held");
    assert_eq!(order["items"][0]["product"], PRODUCT_ID);
    assert_eq!(order["items"][0]["price"], 100.0);
    assert_eq!(order["items"][0]["sellerId"], SELLER);
}

#[actix_web::test]
async fn client_supplied_total_is_ignored() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().returning(|_| Ok(Some(product(PRODUCT_ID, 10_000, 5))));
    backends
        .placement
        .expect_insert_order_and_reserve_stock()
        .withf(|o: &NewOrder| o.total_amount == Cents::from(13_300))
        .returning(|o| Ok(order_from(o)));
    let req = TestRequest::post().uri("/api/orders").insert_header(bearer(CUSTOMER, Role::Customer)).set_json(json!({
        "items": [{"product": PRODUCT_ID, "quantity": 1}],
        "shippingDetails": shipping(),
        "totalAmount": 1,
    }));
    let (status, body) = send(req, backends).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json(&body)["totalAmount"], 133.0);
}

#[actix_web::test]
async fn totals_that_overflow_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().returning(|_| Ok(Some(product(PRODUCT_ID, 10_000, i64::MAX))));
    backends.placement.expect_insert_order_and_reserve_stock().never();
    let (status, body) = send(checkout(i64::MAX / 1_000), backends).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "The order total is too large");
}

#[actix_web::test]
async fn empty_cart_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/api/orders")
        .insert_header(bearer(CUSTOMER, Role::Customer))
        .set_json(json!({"items": [], "shippingDetails": shipping()}));
    let (status, body) = send(req, Backends::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Your cart is empty");
}

#[actix_web::test]
async fn malformed_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/api/orders")
        .insert_header(bearer(CUSTOMER, Role::Customer))
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload("{\"items\": [{\"product\": ");
    let (status, body) = send(req, Backends::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Could not read request body"), "was: {body}");
}

#[actix_web::test]
async fn insufficient_stock_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().returning(|_| Ok(Some(product(PRODUCT_ID, 10_000, 1))));
    backends.placement.expect_insert_order_and_reserve_stock().never();
    let (status, body) = send(checkout(2), backends).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Insufficient stock for Intro to Algorithms. Requested 2, but only 1 available"
    );
}

#[actix_web::test]
async fn losing_the_stock_race_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().returning(|_| Ok(Some(product(PRODUCT_ID, 10_000, 2))));
    backends.placement.expect_insert_order_and_reserve_stock().returning(|o| {
        Err(OrderManagementError::InsufficientStock { product: o.items[0].product_id.clone(), available: 1, requested: 2 })
    });
    let (status, body) = send(checkout(2), backends).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("only 1 available"), "was: {body}");
}

#[actix_web::test]
async fn unknown_product_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().returning(|_| Ok(None));
    let (status, body) = send(checkout(1), backends).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), format!("Product {PRODUCT_ID} not found"));
}

#[actix_web::test]
async fn storage_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.placement.expect_fetch_product().returning(|_| Ok(Some(product(PRODUCT_ID, 10_000, 5))));
    backends
        .placement
        .expect_insert_order_and_reserve_stock()
        .returning(|_| Err(OrderManagementError::DatabaseError("disk I/O error".into())));
    let (status, body) = send(checkout(1), backends).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(&body).contains("disk I/O error"), "was: {body}");
}

#[actix_web::test]
async fn order_history_is_for_the_caller_only() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.queries.expect_fetch_orders_for_customer().with(eq(UserId::from(CUSTOMER))).times(1).returning(|c| {
        let p = product(PRODUCT_ID, 10_000, 5);
        let order = NewOrder::new(c.clone(), vec![OrderItem::from_product(&p, 1)], shipping(), Cents::from(13_300));
        Ok(vec![order_from(order)])
    });
    let req = TestRequest::get().uri("/api/orders/me").insert_header(bearer(CUSTOMER, Role::Customer));
    let (status, body) = send(req, backends).await;
    assert_eq!(status, StatusCode::OK);
    let orders = json(&body);
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
    assert_eq!(orders[0]["customerId"], CUSTOMER);
    assert_eq!(orders[0]["shippingDetails"]["city"], "Durban");
}
