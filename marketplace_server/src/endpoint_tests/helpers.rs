use std::sync::Arc;

use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use chrono::{Duration, TimeZone, Utc};
use marketplace_engine::{
    db_types::{
        Category,
        Cents,
        EscrowStatus,
        NewOrder,
        Order,
        OrderStatusType,
        Product,
        ProductId,
        Role,
        Seller,
        SellerStatus,
        ShippingDetails,
        UserId,
    },
    events::EventProducers,
    order_objects::PricingPolicy,
    OrderPlacementApi,
    OrderQueryApi,
    ProductApi,
    SellerApi,
    SellerPolicy,
};
use serde_json::Value;

use super::mocks::MockMarketplace;
use crate::{
    auth::{JwtClaims, TokenIssuer, TokenValidator},
    config::AuthConfig,
    server::{configure_routes, json_config},
};

pub const CUSTOMER: &str = "cust-ayesha";
pub const SELLER: &str = "seller-kagiso";

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-tests-secret-do-not-reuse", Duration::hours(1))
}

pub fn token_for(user: &str, role: Role) -> String {
    TokenIssuer::new(&auth_config()).issue_token(JwtClaims::new(user, role)).expect("Failed to sign token")
}

pub fn bearer(user: &str, role: Role) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token_for(user, role)))
}

/// One mock backend per engine API. Set expectations on the ones a test touches and leave the rest alone; an
/// unexpected call on any of them fails the test.
#[derive(Default)]
pub struct Backends {
    pub products: MockMarketplace,
    pub placement: MockMarketplace,
    pub queries: MockMarketplace,
    pub sellers: MockMarketplace,
}

impl Backends {
    /// Every seller call succeeds and the seller is active.
    pub fn with_active_seller(mut self) -> Self {
        self.sellers.expect_record_seller_activity().returning(|id, at| Ok(seller(id.as_str(), SellerStatus::Active, at)));
        self
    }
}

/// Runs `req` through an app wired exactly like the real server, and returns the status and body. Errors raised by
/// middleware are rendered the way actix renders them for a live connection.
pub async fn send(req: TestRequest, backends: Backends) -> (StatusCode, String) {
    let Backends { products, placement, queries, sellers } = backends;
    let validator = Arc::new(TokenValidator::new(&auth_config()));
    let app = App::new()
        .app_data(json_config())
        .app_data(web::Data::new(ProductApi::new(products, EventProducers::default())))
        .app_data(web::Data::new(OrderPlacementApi::new(placement, PricingPolicy::default(), EventProducers::default())))
        .app_data(web::Data::new(OrderQueryApi::new(queries, EventProducers::default())))
        .app_data(web::Data::new(SellerApi::new(sellers, SellerPolicy::default(), EventProducers::default())))
        .configure(|cfg| configure_routes::<MockMarketplace>(cfg, validator));
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = actix_web::body::to_bytes(res.into_body()).await.expect("Could not read error body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response was not JSON ({e}): {body}"))
}

pub fn error_message(body: &str) -> String {
    json(body)["error"].as_str().unwrap_or_else(|| panic!("No error field in {body}")).to_string()
}

pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap()
}

pub fn product(id: &str, price: i64, stock: i64) -> Product {
    Product {
        id: id.parse::<ProductId>().expect("Invalid test product id"),
        seller_id: UserId::from(SELLER),
        name: "Intro to Algorithms".to_string(),
        description: "Hardcover, lightly highlighted".to_string(),
        price: Cents::from(price),
        stock,
        category: Category::Textbook,
        on_special: false,
        old_price: Cents::default(),
        special_end: None,
        image: "clrs.jpg".to_string(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn shipping() -> ShippingDetails {
    ShippingDetails {
        name: "Ayesha Patel".into(),
        email: "ayesha@students.example.edu".into(),
        phone: None,
        address: "5 Residence Lane".into(),
        city: "Durban".into(),
    }
}

pub fn order_from(new_order: NewOrder) -> Order {
    Order {
        id: new_order.id,
        customer_id: new_order.customer_id,
        items: new_order.items,
        shipping_details: new_order.shipping_details,
        total_amount: new_order.total_amount,
        status: OrderStatusType::Pending,
        escrow_status: EscrowStatus::Held,
        payment_id: new_order.payment_id,
        tracking_number: None,
        created_at: new_order.created_at,
        updated_at: new_order.created_at,
    }
}

pub fn seller(id: &str, status: SellerStatus, last_active: chrono::DateTime<Utc>) -> Seller {
    let locked = status == SellerStatus::Locked;
    Seller {
        id: UserId::from(id),
        email: None,
        business_name: None,
        status,
        last_active,
        reactivation_fee_owed: if locked { Cents::from(15_000) } else { Cents::default() },
        deactivation_reason: locked.then(|| "Automatic lock due to 60 days of inactivity.".to_string()),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub const PRODUCT_ID: &str = "6f1d1c7e-2b8a-4a7c-9a57-3c1f2f5d9e01";
pub const ORDER_ID: &str = "0d9b4d1e-7c3a-4f0e-8e2b-95a1c7d3b6f4";
