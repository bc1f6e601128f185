//! Per-platform send detection and compose-field extraction.
//!
//! Each supported mail client gets one [`PlatformStrategy`]. The strategy is
//! picked once per page from the [`PlatformVariant`]; adding a client means
//! adding a host fragment in `platform` and one implementation here.

pub mod gmail;
pub mod inert;
pub mod outlook;

use crate::dom::{Dom, InteractionEvent};
use crate::platform::PlatformVariant;
use serde::{Deserialize, Serialize};

/// Best-effort snapshot of the compose form at the moment of sending.
///
/// Missing fields stay empty; recipients may contain duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftFields {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl DraftFields {
    /// Record a recipient token, ignoring blank values.
    pub fn add_recipient(&mut self, recipient: &str) {
        let recipient = recipient.trim();
        if !recipient.is_empty() {
            self.recipients.push(recipient.to_string());
        }
    }
}

pub trait PlatformStrategy<D: Dom>: Send + Sync {
    fn variant(&self) -> PlatformVariant;

    /// Whether a click is the user dispatching the draft.
    fn is_send_intent(&self, dom: &D, event: &InteractionEvent<D::Node>) -> bool;

    /// Read the compose form. Absent nodes yield empty fields, never errors.
    fn extract_fields(&self, dom: &D) -> DraftFields;
}

pub fn strategy_for<D: Dom>(variant: PlatformVariant) -> Box<dyn PlatformStrategy<D>> {
    match variant {
        PlatformVariant::Gmail => Box::new(gmail::GmailStrategy),
        PlatformVariant::Outlook => Box::new(outlook::OutlookStrategy::new()),
        PlatformVariant::Unknown => Box::new(inert::InertStrategy),
    }
}
