use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderCreatedEvent,
    OrderStatusChangedEvent,
    SellerLockedEvent,
    SpecialPriceExpiredEvent,
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_created_producer: Vec<EventProducer<OrderCreatedEvent>>,
    pub order_status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
    pub special_expired_producer: Vec<EventProducer<SpecialPriceExpiredEvent>>,
    pub seller_locked_producer: Vec<EventProducer<SellerLockedEvent>>,
}

impl EventProducers {
    pub async fn publish_order_created(&self, event: OrderCreatedEvent) {
        for emitter in &self.order_created_producer {
            trace!("📬️ Notifying order created hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_order_status_changed(&self, event: OrderStatusChangedEvent) {
        for emitter in &self.order_status_changed_producer {
            trace!("📬️ Notifying order status hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_special_expired(&self, event: SpecialPriceExpiredEvent) {
        for emitter in &self.special_expired_producer {
            trace!("📬️ Notifying special expiry hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_seller_locked(&self, event: SellerLockedEvent) {
        for emitter in &self.seller_locked_producer {
            trace!("📬️ Notifying seller lock hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_order_created: Option<EventHandler<OrderCreatedEvent>>,
    pub on_order_status_changed: Option<EventHandler<OrderStatusChangedEvent>>,
    pub on_special_expired: Option<EventHandler<SpecialPriceExpiredEvent>>,
    pub on_seller_locked: Option<EventHandler<SellerLockedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        Self {
            on_order_created: hooks.on_order_created.map(|f| EventHandler::new(buffer_size, f)),
            on_order_status_changed: hooks.on_order_status_changed.map(|f| EventHandler::new(buffer_size, f)),
            on_special_expired: hooks.on_special_expired.map(|f| EventHandler::new(buffer_size, f)),
            on_seller_locked: hooks.on_seller_locked.map(|f| EventHandler::new(buffer_size, f)),
        }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_created {
            result.order_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_status_changed {
            result.order_status_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_special_expired {
            result.special_expired_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_seller_locked {
            result.seller_locked_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task per registered hook. Each task ends when all of its producers have been dropped.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_status_changed {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_special_expired {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_seller_locked {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_created: Option<Handler<OrderCreatedEvent>>,
    pub on_order_status_changed: Option<Handler<OrderStatusChangedEvent>>,
    pub on_special_expired: Option<Handler<SpecialPriceExpiredEvent>>,
    pub on_seller_locked: Option<Handler<SellerLockedEvent>>,
}

impl EventHooks {
    pub fn on_order_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCreatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_created = Some(Arc::new(f));
        self
    }

    pub fn on_order_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_status_changed = Some(Arc::new(f));
        self
    }

    pub fn on_special_expired<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SpecialPriceExpiredEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_special_expired = Some(Arc::new(f));
        self
    }

    pub fn on_seller_locked<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SellerLockedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_seller_locked = Some(Arc::new(f));
        self
    }
}
