use crate::event::OutboundMailEvent;
use crate::report::{Report, ReportSink};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use url::Url;

/// Carries a serialized event to the collector and returns the HTTP status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &Url, body: String) -> anyhow::Result<u16>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("send-sentry/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &Url, body: String) -> anyhow::Result<u16> {
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        // Any status is a completed delivery; the body is never read.
        Ok(response.status().as_u16())
    }
}

struct Courier {
    endpoint: Url,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ReportSink>,
}

impl Courier {
    async fn post(&self, event: OutboundMailEvent) {
        let body = match serde_json::to_string(&event) {
            Ok(body) => body,
            Err(e) => {
                self.sink.report(Report::DeliveryFailed {
                    error: format!("serialization: {e}"),
                });
                return;
            }
        };

        log::debug!("Posting mail event to {}: {}", self.endpoint, event.log_payload());
        match self.transport.post_json(&self.endpoint, body).await {
            Ok(status) => self.sink.report(Report::Delivered { status }),
            Err(e) => self.sink.report(Report::DeliveryFailed {
                error: format!("{e:#}"),
            }),
        }
    }
}

/// Best-effort, fire-and-forget shipping of mail events.
///
/// [`DeliveryClient::deliver`] only enqueues; a background worker posts each
/// event in its own task. Failures are reported to the sink and dropped:
/// there is no retry and no backoff.
pub struct DeliveryClient {
    courier: Arc<Courier>,
    sender: mpsc::UnboundedSender<OutboundMailEvent>,
    worker: JoinHandle<()>,
}

impl DeliveryClient {
    /// Start the delivery worker on the current tokio runtime.
    pub fn new(
        endpoint: Url,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ReportSink>,
    ) -> anyhow::Result<Self> {
        let handle =
            Handle::try_current().context("Mail delivery requires a running tokio runtime")?;
        let courier = Arc::new(Courier {
            endpoint,
            transport,
            sink,
        });
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = handle.spawn(Self::delivery_worker(courier.clone(), receiver));

        Ok(Self {
            courier,
            sender,
            worker,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.courier.endpoint
    }

    /// Queue an event for delivery. Never blocks and never fails the caller.
    pub fn deliver(&self, event: OutboundMailEvent) {
        if let Err(e) = self.sender.send(event) {
            log::warn!("Delivery worker is gone, dropping mail event: {}", e.0.summary());
        }
    }

    /// Post one event now and report the outcome.
    pub async fn post(&self, event: OutboundMailEvent) {
        self.courier.post(event).await;
    }

    /// Stop accepting events and wait for in-flight deliveries.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            log::error!("Delivery worker ended abnormally: {e}");
        }
    }

    async fn delivery_worker(
        courier: Arc<Courier>,
        mut receiver: mpsc::UnboundedReceiver<OutboundMailEvent>,
    ) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                event = receiver.recv() => {
                    match event {
                        Some(event) => {
                            let courier = courier.clone();
                            in_flight.spawn(async move { courier.post(event).await });
                        }
                        None => break,
                    }
                }
                Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = result {
                        log::error!("Mail delivery task failed: {e}");
                    }
                }
            }
        }

        while let Some(result) = in_flight.join_next().await {
            if let Err(e) = result {
                log::error!("Mail delivery task failed: {e}");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Transport;
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use url::Url;

    /// Accepts every post with status 200 and forwards the body to the test.
    pub struct RecordingTransport {
        bodies: mpsc::UnboundedSender<(Url, String)>,
    }

    impl RecordingTransport {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<(Url, String)>) {
            let (bodies, receiver) = mpsc::unbounded_channel();
            (Self { bodies }, receiver)
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post_json(&self, url: &Url, body: String) -> anyhow::Result<u16> {
            let _ = self.bodies.send((url.clone(), body));
            Ok(200)
        }
    }

    pub struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn post_json(&self, _url: &Url, _body: String) -> anyhow::Result<u16> {
            anyhow::bail!("connection refused")
        }
    }
}
