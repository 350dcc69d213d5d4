use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, OrderStatusType, OrderStatusUpdate, UserId},
    events::{EventProducers, OrderStatusChangedEvent},
    mkt_api::errors::OrderQueryError,
    traits::{OrderManagement, OrderManagementError},
};

/// `OrderQueryApi` lists orders for customers and sellers, and lets sellers move orders through fulfilment.
pub struct OrderQueryApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, OrderQueryError> {
        Ok(self.db.fetch_orders_for_customer(customer).await?)
    }

    pub async fn orders_for_seller(&self, seller: &UserId) -> Result<Vec<Order>, OrderQueryError> {
        Ok(self.db.fetch_orders_for_seller(seller).await?)
    }

    /// Fetches an order that contains at least one of the seller's items. Orders the seller has no stake in are
    /// reported as not found.
    pub async fn order_for_seller(&self, seller: &UserId, id: &str) -> Result<Order, OrderQueryError> {
        let oid = id.parse::<OrderId>().map_err(|e| OrderQueryError::InvalidIdentity(e.0))?;
        self.db
            .fetch_order(&oid)
            .await?
            .filter(|o| o.has_items_from(seller))
            .ok_or_else(|| OrderQueryError::OrderNotFound(oid.to_string()))
    }

    /// Moves an order to `new_status` on behalf of a seller with items in it.
    ///
    /// The tracking number is kept only when the order is `Shipped`. Delivering an order releases escrow, and
    /// cancelling it refunds escrow.
    pub async fn update_status_for_seller(
        &self,
        seller: &UserId,
        id: &str,
        new_status: OrderStatusType,
        tracking_number: Option<String>,
    ) -> Result<Order, OrderQueryError> {
        let order = self.order_for_seller(seller, id).await?;
        let old_status = order.status;
        if !old_status.can_transition_to(new_status) {
            debug!("📦️ Seller {seller} tried to move order {} from {old_status} to {new_status}", order.id);
            return Err(OrderQueryError::InvalidStatusTransition { from: old_status, to: new_status });
        }
        let update = OrderStatusUpdate::new(old_status, new_status, tracking_number);
        let order = self.db.update_order_status(&order.id, update).await.map_err(|e| match e {
            OrderManagementError::StatusChanged { order, current } => {
                debug!("📦️ Order {order} moved to {current} while seller {seller} was updating it");
                OrderQueryError::InvalidStatusTransition { from: current, to: new_status }
            },
            e => e.into(),
        })?;
        info!("📦️ Order {} moved from {old_status} to {new_status} by seller {seller}", order.id);
        self.producers.publish_order_status_changed(OrderStatusChangedEvent::new(old_status, order.clone())).await;
        Ok(order)
    }
}
