use crate::platform::PlatformVariant;
use std::fmt;

/// Something worth telling the operator about one pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    SendDetected {
        platform: PlatformVariant,
    },
    Extracted {
        platform: PlatformVariant,
        summary: String,
    },
    Delivered {
        status: u16,
    },
    DeliveryFailed {
        error: String,
    },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::SendDetected { platform } => {
                write!(f, "Send click detected on {platform}, capturing draft")
            }
            Report::Extracted { platform, summary } => {
                write!(f, "Captured {platform} draft: {summary}")
            }
            Report::Delivered { status } => write!(f, "Mail event delivered, status {status}"),
            Report::DeliveryFailed { error } => write!(f, "Mail event delivery failed: {error}"),
        }
    }
}

/// Destination for pipeline reports. The only side channel besides the POST.
pub trait ReportSink: Send + Sync {
    fn report(&self, report: Report);
}

/// Writes each report as a single log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, report: Report) {
        match &report {
            Report::SendDetected { .. } | Report::Delivered { .. } => log::info!("{report}"),
            Report::Extracted { .. } => log::debug!("{report}"),
            Report::DeliveryFailed { .. } => log::error!("{report}"),
        }
    }
}
