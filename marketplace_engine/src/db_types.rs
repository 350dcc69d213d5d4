use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use mkt_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid identity")]
pub struct InvalidIdentity(pub String);

/// Declares a UUID-backed identity. Parsing from untrusted input rejects anything that is not a UUID, and normalises
/// the accepted value to its lowercase hyphenated form.
macro_rules! uuid_identity {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn random() -> Self {
                Self(Uuid::new_v4().hyphenated().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = InvalidIdentity;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(|u| Self(u.hyphenated().to_string()))
                    .map_err(|_| InvalidIdentity(s.to_string()))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

uuid_identity!(ProductId);
uuid_identity!(OrderId);

//--------------------------------------        UserId         ---------------------------------------------------------
/// The identity of an authenticated principal (customer or seller), as carried in the `sub` claim of their token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//--------------------------------------        Role           ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Role {
    Customer,
    Seller,
    Admin,
    Agent,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "Customer"),
            Role::Seller => write!(f, "Seller"),
            Role::Admin => write!(f, "Admin"),
            Role::Agent => write!(f, "Agent"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    /// Role names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            "agent" => Ok(Self::Agent),
            _ => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------       Category        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Textbook,
    Electronics,
    Food,
    Clothing,
    Services,
    #[default]
    Other,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Textbook => "TEXTBOOK",
            Category::Electronics => "ELECTRONICS",
            Category::Food => "FOOD",
            Category::Clothing => "CLOTHING",
            Category::Services => "SERVICES",
            Category::Other => "OTHER",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXTBOOK" => Ok(Self::Textbook),
            "ELECTRONICS" => Ok(Self::Electronics),
            "FOOD" => Ok(Self::Food),
            "CLOTHING" | "CLOTHS" => Ok(Self::Clothing),
            "SERVICES" => Ok(Self::Services),
            "OTHER" => Ok(Self::Other),
            _ => Err(ConversionError(format!("Invalid category: {s}"))),
        }
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
pub const DEFAULT_PRODUCT_IMAGE: &str = "no_image.png";

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub stock: i64,
    pub category: Category,
    pub on_special: bool,
    pub old_price: Cents,
    pub special_end: Option<DateTime<Utc>>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// If this product carries a special whose end date is strictly before `now`, returns the price it must revert
    /// to: `old_price` when one was recorded, otherwise the current price.
    pub fn expired_special_reversal(&self, now: DateTime<Utc>) -> Option<Cents> {
        match (self.on_special, self.special_end) {
            (true, Some(end)) if end < now => {
                let restored = if self.old_price.is_positive() { self.old_price } else { self.price };
                Some(restored)
            },
            _ => None,
        }
    }

    /// Applies a special-price reversal to this in-memory record.
    pub fn revert_special(&mut self, restored_price: Cents, now: DateTime<Utc>) {
        self.price = restored_price;
        self.on_special = false;
        self.old_price = Cents::default();
        self.special_end = None;
        self.updated_at = now;
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Checks the special-price invariant: a product on special has an end date and a positive original price; a
/// product that is not on special has neither.
pub fn validate_special_fields(
    on_special: bool,
    old_price: Cents,
    special_end: Option<DateTime<Utc>>,
) -> Result<(), String> {
    if on_special {
        if special_end.is_none() {
            return Err("A special requires an end date".into());
        }
        if !old_price.is_positive() {
            return Err("A special requires the original price to be recorded".into());
        }
    } else {
        if old_price != Cents::default() {
            return Err("The original price may only be set while a product is on special".into());
        }
        if special_end.is_some() {
            return Err("A special end date may only be set while a product is on special".into());
        }
    }
    Ok(())
}

//--------------------------------------      NewProduct       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub seller_id: UserId,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub stock: i64,
    pub category: Category,
    pub on_special: bool,
    pub old_price: Cents,
    pub special_end: Option<DateTime<Utc>>,
    pub image: String,
}

impl NewProduct {
    pub fn new<S: Into<String>>(seller_id: UserId, name: S, price: Cents, stock: i64) -> Self {
        Self {
            seller_id,
            name: name.into(),
            description: String::default(),
            price,
            stock,
            category: Category::default(),
            on_special: false,
            old_price: Cents::default(),
            special_end: None,
            image: DEFAULT_PRODUCT_IMAGE.to_string(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = image.into();
        self
    }

    /// Puts the product on special at its current `price`, remembering `old_price` for when the special lapses.
    pub fn with_special(mut self, old_price: Cents, special_end: DateTime<Utc>) -> Self {
        self.on_special = true;
        self.old_price = old_price;
        self.special_end = Some(special_end);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".into());
        }
        if !self.price.is_positive() {
            return Err("Product price must be greater than zero".into());
        }
        if self.stock < 0 {
            return Err("Product stock cannot be negative".into());
        }
        validate_special_fields(self.on_special, self.old_price, self.special_end)
    }
}

//--------------------------------------     ProductUpdate     ---------------------------------------------------------
/// A partial update to a product. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Cents>,
    pub stock: Option<i64>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub on_special: Option<bool>,
    pub old_price: Option<Cents>,
    /// `Some(None)` clears the end date; `None` leaves it alone.
    #[serde(default, with = "double_option")]
    pub special_end: Option<Option<DateTime<Utc>>>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.on_special.is_none()
            && self.old_price.is_none()
            && self.special_end.is_none()
    }

    pub fn with_price(mut self, price: Cents) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_special(mut self, old_price: Cents, special_end: DateTime<Utc>) -> Self {
        self.on_special = Some(true);
        self.old_price = Some(old_price);
        self.special_end = Some(Some(special_end));
        self
    }

    pub fn end_special(mut self) -> Self {
        self.on_special = Some(false);
        self.old_price = Some(Cents::default());
        self.special_end = Some(None);
        self
    }

    /// The product as it would look after this update is applied.
    pub fn merged_with(&self, product: &Product) -> Product {
        let mut p = product.clone();
        if let Some(name) = &self.name {
            p.name = name.clone();
        }
        if let Some(description) = &self.description {
            p.description = description.clone();
        }
        if let Some(price) = self.price {
            p.price = price;
        }
        if let Some(stock) = self.stock {
            p.stock = stock;
        }
        if let Some(category) = self.category {
            p.category = category;
        }
        if let Some(image) = &self.image {
            p.image = image.clone();
        }
        if let Some(on_special) = self.on_special {
            p.on_special = on_special;
        }
        if let Some(old_price) = self.old_price {
            p.old_price = old_price;
        }
        if let Some(special_end) = self.special_end {
            p.special_end = special_end;
        }
        p
    }

    /// Validates the product that results from applying this update.
    pub fn validate_against(&self, product: &Product) -> Result<(), String> {
        if self.is_empty() {
            return Err("No fields to update".into());
        }
        let merged = self.merged_with(product);
        if merged.name.trim().is_empty() {
            return Err("Product name is required".into());
        }
        if !merged.price.is_positive() {
            return Err("Product price must be greater than zero".into());
        }
        if merged.stock < 0 {
            return Err("Product stock cannot be negative".into());
        }
        validate_special_fields(merged.on_special, merged.old_price, merged.special_end)
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(value: &Option<Option<T>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(d: D) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(d).map(Some)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been placed and stock reserved. Funds are in escrow.
    Pending,
    /// The seller has started fulfilling the order.
    Processing,
    /// The order is on its way to the customer.
    Shipped,
    /// The order has reached the customer. Escrow is released to the seller.
    Delivered,
    /// The order was abandoned. Escrow is refunded to the customer.
    Cancelled,
}

impl OrderStatusType {
    fn rank(&self) -> u8 {
        match self {
            OrderStatusType::Pending => 0,
            OrderStatusType::Processing => 1,
            OrderStatusType::Shipped => 2,
            OrderStatusType::Delivered => 3,
            OrderStatusType::Cancelled => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }

    /// Fulfilment only moves forward. Any order that has not reached a terminal state may be cancelled.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        next == OrderStatusType::Cancelled || next.rank() > self.rank()
    }

    /// The escrow state implied by entering this status, if it changes escrow at all.
    pub fn escrow_effect(&self) -> Option<EscrowStatus> {
        match self {
            OrderStatusType::Delivered => Some(EscrowStatus::Released),
            OrderStatusType::Cancelled => Some(EscrowStatus::Refunded),
            _ => None,
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Shipped => write!(f, "Shipped"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     EscrowStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EscrowStatus {
    #[default]
    Held,
    Released,
    Refunded,
}

impl Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscrowStatus::Held => write!(f, "Held"),
            EscrowStatus::Released => write!(f, "Released"),
            EscrowStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

//--------------------------------------    ShippingDetails    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ShippingDetails {
    #[sqlx(rename = "ship_name")]
    pub name: String,
    #[sqlx(rename = "ship_email")]
    pub email: String,
    #[sqlx(rename = "ship_phone")]
    #[serde(default)]
    pub phone: Option<String>,
    #[sqlx(rename = "ship_address")]
    pub address: String,
    #[sqlx(rename = "ship_city")]
    pub city: String,
}

impl ShippingDetails {
    pub fn validate(&self) -> Result<(), String> {
        let required = [("name", &self.name), ("email", &self.email), ("address", &self.address), ("city", &self.city)];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("Shipping {field} is required"));
        }
        if !self.email.contains('@') {
            return Err(format!("Shipping email '{}' is not a valid email address", self.email));
        }
        Ok(())
    }
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
/// A snapshot of a product line, frozen at the time the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "product")]
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: i64,
    pub price: Cents,
    pub seller_id: UserId,
}

impl OrderItem {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            quantity,
            price: product.price,
            seller_id: product.seller_id.clone(),
        }
    }

    /// Price times quantity, or `None` if that does not fit in `Cents`.
    pub fn line_total(&self) -> Option<Cents> {
        self.price.checked_mul(self.quantity)
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    #[sqlx(flatten)]
    pub shipping_details: ShippingDetails,
    pub total_amount: Cents,
    pub status: OrderStatusType,
    pub escrow_status: EscrowStatus,
    pub payment_id: Option<String>,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn has_items_from(&self, seller: &UserId) -> bool {
        self.items.iter().any(|i| &i.seller_id == seller)
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: OrderId,
    pub customer_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_details: ShippingDetails,
    /// The server-computed total. Client-supplied totals never reach this field.
    pub total_amount: Cents,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(customer_id: UserId, items: Vec<OrderItem>, shipping_details: ShippingDetails, total: Cents) -> Self {
        Self {
            id: OrderId::random(),
            customer_id,
            items,
            shipping_details,
            total_amount: total,
            payment_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_payment_id(mut self, payment_id: Option<String>) -> Self {
        self.payment_id = payment_id;
        self
    }
}

//--------------------------------------   OrderStatusUpdate   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusUpdate {
    /// The status the order must still have for the update to apply.
    pub from: OrderStatusType,
    pub status: OrderStatusType,
    pub escrow_status: Option<EscrowStatus>,
    pub tracking_number: Option<String>,
}

impl OrderStatusUpdate {
    /// Builds the update for moving from `from` to `status`. A tracking number survives only on `Shipped`; every
    /// other status clears it.
    pub fn new(from: OrderStatusType, status: OrderStatusType, tracking_number: Option<String>) -> Self {
        let tracking_number = match status {
            OrderStatusType::Shipped => tracking_number.filter(|t| !t.trim().is_empty()),
            _ => None,
        };
        Self { from, status, escrow_status: status.escrow_effect(), tracking_number }
    }
}

//--------------------------------------     SellerStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SellerStatus {
    #[default]
    Active,
    Locked,
}

impl Display for SellerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SellerStatus::Active => write!(f, "active"),
            SellerStatus::Locked => write!(f, "locked"),
        }
    }
}

//--------------------------------------        Seller         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: UserId,
    pub email: Option<String>,
    pub business_name: Option<String>,
    pub status: SellerStatus,
    pub last_active: DateTime<Utc>,
    pub reactivation_fee_owed: Cents,
    pub deactivation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    pub fn is_locked(&self) -> bool {
        self.status == SellerStatus::Locked
    }
}
