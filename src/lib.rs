pub mod config;
pub mod delivery;
pub mod dom;
pub mod event;
pub mod interceptor;
pub mod platform;
pub mod report;
pub mod strategy;

pub use config::Config;
pub use delivery::{DeliveryClient, HttpTransport, Transport};
pub use event::{normalize, Identity, OutboundMailEvent};
pub use interceptor::Interceptor;
pub use platform::{identify, PlatformVariant};
pub use report::{LogSink, Report, ReportSink};
pub use strategy::{DraftFields, PlatformStrategy};
