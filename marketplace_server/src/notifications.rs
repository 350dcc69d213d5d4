//! Event hooks installed by the server.
//!
//! Nothing is delivered from here yet. Each hook writes a log line, which is where an email or push notification
//! service would plug in.
use futures::future::BoxFuture;
use log::*;
use marketplace_engine::events::{EventHandlers, EventHooks};

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}

pub fn create_logging_event_handlers(buffer_size: usize) -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            let order = ev.order;
            info!(
                "📬️ Order {} placed by {} for {} ({} lines). Confirmation to {}",
                order.id,
                order.customer_id,
                order.total_amount,
                order.items.len(),
                order.shipping_details.email
            );
            no_op()
        })
        .on_order_status_changed(|ev| {
            let order = ev.order;
            info!(
                "📬️ Order {} moved from {} to {}. Escrow is {}",
                order.id, ev.old_status, order.status, order.escrow_status
            );
            no_op()
        })
        .on_special_expired(|ev| {
            let product = ev.product;
            info!(
                "📬️ Special on {} ({}) ended. Price restored from {} to {}",
                product.id, product.name, ev.special_price, product.price
            );
            no_op()
        })
        .on_seller_locked(|ev| {
            let seller = ev.seller;
            let email = seller.email.as_deref().unwrap_or("no email on file");
            warn!(
                "📬️ Seller {} ({email}) was locked. Reactivation fee owed: {}",
                seller.id, seller.reactivation_fee_owed
            );
            no_op()
        });
    EventHandlers::new(buffer_size, hooks)
}
