use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderCapturedEvent, OrderVerifiedEvent};

/// The publishing side of every registered hook. Cheap to clone, and handed to each API that emits events.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_verified_producer: Vec<EventProducer<OrderVerifiedEvent>>,
    pub order_captured_producer: Vec<EventProducer<OrderCapturedEvent>>,
}

pub struct EventHandlers {
    pub on_order_verified: Option<EventHandler<OrderVerifiedEvent>>,
    pub on_order_captured: Option<EventHandler<OrderCapturedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_verified = hooks.on_order_verified.map(|f| EventHandler::new(buffer_size, f));
        let on_order_captured = hooks.on_order_captured.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_verified, on_order_captured }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_verified {
            result.order_verified_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_captured {
            result.order_captured_producer.push(handler.subscribe());
        }
        result
    }

    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_verified {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_captured {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_verified: Option<Handler<OrderVerifiedEvent>>,
    pub on_order_captured: Option<Handler<OrderCapturedEvent>>,
}

impl EventHooks {
    pub fn on_order_verified<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderVerifiedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_verified = Some(Arc::new(f));
        self
    }

    pub fn on_order_captured<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCapturedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_captured = Some(Arc::new(f));
        self
    }
}
