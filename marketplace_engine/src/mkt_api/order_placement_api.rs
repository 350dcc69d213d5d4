use std::{collections::HashMap, fmt::Debug};

use log::*;
use mkt_common::Cents;

use crate::{
    db_types::{NewOrder, Order, OrderItem, Product, ProductId, UserId},
    events::{EventProducers, OrderCreatedEvent},
    mkt_api::{
        errors::OrderPlacementError,
        order_objects::{PlaceOrderRequest, PricingPolicy},
        product_api::reconcile_special_price,
    },
    traits::{OrderManagement, OrderManagementError, ProductCatalog},
};

/// `OrderPlacementApi` turns a customer's cart into an order.
///
/// Prices always come from the product records (after any lapsed special has been reverted); whatever the client
/// claims an item or the order costs is ignored. The order, its item snapshots and the stock reservations are written
/// in one atomic step by the backend, so stock never goes negative and an order never exists without its stock.
pub struct OrderPlacementApi<B> {
    db: B,
    pricing: PricingPolicy,
    producers: EventProducers,
}

impl<B> Debug for OrderPlacementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderPlacementApi ({:?})", self.pricing)
    }
}

impl<B> OrderPlacementApi<B> {
    pub fn new(db: B, pricing: PricingPolicy, producers: EventProducers) -> Self {
        Self { db, pricing, producers }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }
}

impl<B> OrderPlacementApi<B>
where B: ProductCatalog + OrderManagement
{
    pub async fn place_order(
        &self,
        customer: &UserId,
        request: PlaceOrderRequest,
    ) -> Result<Order, OrderPlacementError> {
        let PlaceOrderRequest { items, shipping_details, total_amount: client_total, payment_id } = request;
        if items.is_empty() {
            debug!("🛒 Customer {customer} submitted an empty cart");
            return Err(OrderPlacementError::EmptyCart);
        }
        // Products already seen in this cart, with the quantity requested so far.
        let mut seen: HashMap<ProductId, (Product, i64)> = HashMap::new();
        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            let pid = item
                .product
                .parse::<ProductId>()
                .map_err(|e| OrderPlacementError::InvalidIdentity(e.0))?;
            if item.quantity < 1 {
                return Err(OrderPlacementError::ValidationFailed(format!(
                    "Quantity for product {pid} must be at least 1"
                )));
            }
            let product = match seen.get(&pid) {
                Some((p, _)) => p.clone(),
                None => {
                    let p = self
                        .db
                        .fetch_product(&pid)
                        .await?
                        .ok_or_else(|| OrderPlacementError::ProductNotFound(pid.to_string()))?;
                    reconcile_special_price(&self.db, &self.producers, p).await?
                },
            };
            let requested = seen.get(&pid).map(|(_, q)| *q).unwrap_or(0).checked_add(item.quantity).ok_or_else(|| {
                OrderPlacementError::ValidationFailed(format!("Quantity for product {pid} is too large"))
            })?;
            if product.stock < requested {
                debug!("🛒 Not enough stock of {pid} for customer {customer}: {requested} > {}", product.stock);
                return Err(OrderPlacementError::InsufficientStock {
                    product: pid,
                    name: product.name,
                    available: product.stock,
                    requested,
                });
            }
            order_items.push(OrderItem::from_product(&product, item.quantity));
            seen.insert(pid, (product, requested));
        }
        shipping_details.validate().map_err(OrderPlacementError::ValidationFailed)?;

        let totals = order_items
            .iter()
            .try_fold(Cents::default(), |acc, item| acc.checked_add(item.line_total()?))
            .and_then(|subtotal| self.pricing.totals_for(subtotal))
            .ok_or_else(|| {
                debug!("🛒 Order total for customer {customer} is too large to represent");
                OrderPlacementError::ValidationFailed("The order total is too large".to_string())
            })?;
        if let Some(claimed) = client_total.filter(|t| *t != totals.total) {
            debug!("🛒 Customer {customer} claimed a total of {claimed}. Using the computed total of {}", totals.total);
        }
        let new_order =
            NewOrder::new(customer.clone(), order_items, shipping_details, totals.total).with_payment_id(payment_id);
        let order = self.db.insert_order_and_reserve_stock(new_order).await.map_err(|e| {
            let names = seen.iter().map(|(id, (p, _))| (id.clone(), p.name.clone())).collect();
            placement_error_from_store(e, names)
        })?;
        info!("🛒 Order {} placed by {customer}: {totals}", order.id);
        self.producers.publish_order_created(OrderCreatedEvent::new(order.clone())).await;
        Ok(order)
    }
}

/// Stock can still run out between validation and the atomic write, when another order wins the race.
fn placement_error_from_store(e: OrderManagementError, names: HashMap<ProductId, String>) -> OrderPlacementError {
    match e {
        OrderManagementError::InsufficientStock { product, available, requested } => {
            warn!("🛒 Lost a stock reservation race on product {product}");
            let name = names.get(&product).cloned().unwrap_or_else(|| product.to_string());
            OrderPlacementError::InsufficientStock { product, name, available, requested }
        },
        OrderManagementError::ProductNotFound(id) => OrderPlacementError::ProductNotFound(id.to_string()),
        e => {
            error!("🛒 Could not store order: {e}");
            OrderPlacementError::Unexpected(e.to_string())
        },
    }
}
