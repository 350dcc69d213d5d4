use std::fmt::Display;

use mkt_common::Cents;
use serde::{Deserialize, Serialize};

use crate::db_types::ShippingDetails;

pub const DEFAULT_SHIPPING_FEE: Cents = Cents::from_units(50);
pub const DEFAULT_TAX_RATE_BPS: i64 = 800;

/// One line of a customer's cart, exactly as submitted. Nothing here is trusted: the product reference is parsed and
/// looked up, and no price is accepted from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: String,
    pub quantity: i64,
}

impl CartItem {
    pub fn new<S: Into<String>>(product: S, quantity: i64) -> Self {
        Self { product: product.into(), quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub shipping_details: ShippingDetails,
    /// Accepted for compatibility, but always replaced by the server-computed total.
    #[serde(default)]
    pub total_amount: Option<Cents>,
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl PlaceOrderRequest {
    pub fn new(items: Vec<CartItem>, shipping_details: ShippingDetails) -> Self {
        Self { items, shipping_details, total_amount: None, payment_id: None }
    }
}

/// Shipping and tax rules applied to every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub shipping_fee: Cents,
    /// Tax rate in basis points. 800 is 8%.
    pub tax_rate_bps: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self { shipping_fee: DEFAULT_SHIPPING_FEE, tax_rate_bps: DEFAULT_TAX_RATE_BPS }
    }
}

impl PricingPolicy {
    pub fn new(shipping_fee: Cents, tax_rate_bps: i64) -> Self {
        Self { shipping_fee, tax_rate_bps }
    }

    /// Adds shipping and tax to `subtotal`. Returns `None` if the total does not fit in `Cents`.
    pub fn totals_for(&self, subtotal: Cents) -> Option<OrderTotals> {
        let tax = subtotal.apply_rate_bps(self.tax_rate_bps)?;
        let total = subtotal.checked_add(self.shipping_fee)?.checked_add(tax)?;
        Some(OrderTotals { subtotal, shipping: self.shipping_fee, tax, total })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Cents,
    pub shipping: Cents,
    pub tax: Cents,
    pub total: Cents,
}

impl Display for OrderTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {} shipping + {} tax = {}", self.subtotal, self.shipping, self.tax, self.total)
    }
}
