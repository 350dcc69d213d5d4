use actix_web::{http::StatusCode, test::TestRequest};
use chrono::{Duration, Utc};
use marketplace_engine::db_types::Cents;
use mockall::predicate::eq;

use super::helpers::*;

#[actix_web::test]
async fn listing_asks_for_in_stock_products_only() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends
        .products
        .expect_fetch_products()
        .withf(|filter| filter.in_stock_only && filter.seller_id.is_none())
        .times(1)
        .returning(|_| Ok(vec![product(PRODUCT_ID, 45_000, 2)]));
    let (status, body) = send(TestRequest::get().uri("/api/shop/products"), backends).await;
    assert_eq!(status, StatusCode::OK);
    let listing = json(&body);
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
    assert_eq!(listing[0]["id"], PRODUCT_ID);
    assert_eq!(listing[0]["price"], 450.0);
    assert_eq!(listing[0]["sellerId"], SELLER);
}

#[actix_web::test]
async fn listing_reverts_lapsed_specials() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.products.expect_fetch_products().returning(|_| {
        let mut p = product(PRODUCT_ID, 8_000, 4);
        p.on_special = true;
        p.old_price = Cents::from(12_000);
        p.special_end = Some(Utc::now() - Duration::hours(3));
        Ok(vec![p])
    });
    backends
        .products
        .expect_revert_special_price()
        .withf(|id, price| id.as_str() == PRODUCT_ID && *price == Cents::from(12_000))
        .times(1)
        .returning(|_, _| Ok(true));
    let (status, body) = send(TestRequest::get().uri("/api/shop/products"), backends).await;
    assert_eq!(status, StatusCode::OK);
    let listing = json(&body);
    assert_eq!(listing[0]["price"], 120.0);
    assert_eq!(listing[0]["onSpecial"], false);
    assert_eq!(listing[0]["oldPrice"], 0.0);
    assert!(listing[0]["specialEnd"].is_null());
}

#[actix_web::test]
async fn single_product() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    let id = PRODUCT_ID.parse::<marketplace_engine::db_types::ProductId>().unwrap();
    backends.products.expect_fetch_product().with(eq(id)).returning(|_| Ok(Some(product(PRODUCT_ID, 45_000, 2))));
    let (status, body) = send(TestRequest::get().uri(&format!("/api/shop/products/{PRODUCT_ID}")), backends).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["name"], "Intro to Algorithms");
}

#[actix_web::test]
async fn malformed_product_id_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/api/shop/products/not-a-uuid"), Backends::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid product id"), "was: {body}");
}

#[actix_web::test]
async fn sold_out_and_missing_products_are_not_found() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.products.expect_fetch_product().returning(|_| Ok(Some(product(PRODUCT_ID, 45_000, 0))));
    let (status, _) = send(TestRequest::get().uri(&format!("/api/shop/products/{PRODUCT_ID}")), backends).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut backends = Backends::default();
    backends.products.expect_fetch_product().returning(|_| Ok(None));
    let (status, body) = send(TestRequest::get().uri(&format!("/api/shop/products/{PRODUCT_ID}")), backends).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), format!("Product {PRODUCT_ID} not found"));
}

#[actix_web::test]
async fn listing_serves_the_stored_product_when_the_special_changed_underneath() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    let expired = || {
        let mut p = product(PRODUCT_ID, 8_000, 4);
        p.on_special = true;
        p.old_price = Cents::from(12_000);
        p.special_end = Some(Utc::now() - Duration::hours(3));
        p
    };
    backends.products.expect_fetch_products().returning(move |_| Ok(vec![expired()]));
    backends.products.expect_revert_special_price().times(1).returning(|_, _| Ok(false));
    backends.products.expect_fetch_product().times(1).returning(|_| {
        let mut p = product(PRODUCT_ID, 9_500, 4);
        p.on_special = true;
        p.old_price = Cents::from(12_000);
        p.special_end = Some(Utc::now() + Duration::days(2));
        Ok(Some(p))
    });
    let (status, body) = send(TestRequest::get().uri("/api/shop/products"), backends).await;
    assert_eq!(status, StatusCode::OK);
    let listing = json(&body);
    assert_eq!(listing[0]["price"], 95.0);
    assert_eq!(listing[0]["onSpecial"], true);
    assert_eq!(listing[0]["oldPrice"], 120.0);
}
