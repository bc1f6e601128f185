//! Click → capture → normalize → deliver.
//!
//! The listener runs in the capture phase and finishes extraction before it
//! returns, because the compose form may be torn down by the page's own send
//! handler. Only the network call is deferred, onto the delivery worker.

use crate::delivery::DeliveryClient;
use crate::dom::{Dom, EventKind, EventTarget, InteractionEvent, Phase};
use crate::event::{normalize, Identity, OutboundMailEvent};
use crate::platform::{identify, PlatformVariant};
use crate::report::{Report, ReportSink};
use crate::strategy::{strategy_for, PlatformStrategy};
use std::rc::Rc;
use std::sync::Arc;

pub struct Interceptor<D: Dom> {
    strategy: Box<dyn PlatformStrategy<D>>,
    identity: Identity,
    delivery: Arc<DeliveryClient>,
    sink: Arc<dyn ReportSink>,
}

impl<D: Dom + 'static> Interceptor<D> {
    /// Pick the platform strategy for `host`; fixed for the page's lifetime.
    pub fn new(
        host: &str,
        identity: Identity,
        delivery: Arc<DeliveryClient>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let variant = identify(host);
        match variant {
            PlatformVariant::Unknown => {
                log::info!("Host {host} is not a supported mail client, interceptor inert")
            }
            _ => log::info!("Mail interceptor loaded for {variant} on {host}"),
        }
        Self {
            strategy: strategy_for(variant),
            identity,
            delivery,
            sink,
        }
    }

    pub fn platform(&self) -> PlatformVariant {
        self.strategy.variant()
    }

    /// Register the single document-level capture listener for clicks.
    pub fn install<T>(self: Rc<Self>, target: &mut T)
    where
        T: EventTarget<Document = D>,
    {
        target.add_event_listener(
            EventKind::Click,
            Phase::Capture,
            Box::new(move |dom: &D, event: &InteractionEvent<D::Node>| {
                self.handle(dom, event);
            }),
        );
    }

    /// Process one interaction. Returns the event handed to delivery, if any.
    pub fn handle(&self, dom: &D, event: &InteractionEvent<D::Node>) -> Option<OutboundMailEvent> {
        if event.kind != EventKind::Click || !self.strategy.is_send_intent(dom, event) {
            return None;
        }

        let platform = self.platform();
        self.sink.report(Report::SendDetected { platform });

        let fields = self.strategy.extract_fields(dom);
        let mail = normalize(fields, &self.identity);
        self.sink.report(Report::Extracted {
            platform,
            summary: mail.summary(),
        });

        self.delivery.deliver(mail.clone());
        Some(mail)
    }
}
