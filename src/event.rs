use crate::config::mask_secret;
use crate::strategy::DraftFields;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const UNKNOWN_RECIPIENT: &str = "Unknown/Bcc";
pub const NO_SUBJECT: &str = "(No Subject)";
/// Body preview length, counted in Unicode scalar values.
pub const BODY_PREVIEW_CHARS: usize = 500;
const RECIPIENT_SEPARATOR: &str = "; ";

/// Who is reporting: embedded in every event for attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub agent_id: String,
    pub tenant_key: String,
    pub sender: String,
}

/// Canonical record posted to the collector. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundMailEvent {
    pub agent_id: String,
    #[serde(rename = "TenantApiKey")]
    pub tenant_key: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body_preview: String,
    pub has_attachments: bool,
    pub attachment_names: String,
    pub timestamp: String,
}

impl OutboundMailEvent {
    /// Compact rendering for log lines; the tenant key is left out.
    pub fn summary(&self) -> String {
        format!(
            "to=[{}] subject=\"{}\" body_chars={}",
            self.recipient,
            self.subject,
            self.body_preview.chars().count()
        )
    }

    /// The JSON payload with the tenant key masked, for debug logging.
    pub fn log_payload(&self) -> String {
        let masked = OutboundMailEvent {
            tenant_key: mask_secret(&self.tenant_key),
            ..self.clone()
        };
        serde_json::to_string(&masked).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

/// Build the wire record for one detected send.
///
/// Recipients are deduplicated keeping first occurrence; missing recipient
/// and subject are replaced by sentinels. Attachment detection is not
/// performed, so attachments are always reported as absent.
pub fn normalize(fields: DraftFields, identity: &Identity) -> OutboundMailEvent {
    let mut seen = HashSet::new();
    let recipients: Vec<&str> = fields
        .recipients
        .iter()
        .map(String::as_str)
        .filter(|recipient| seen.insert(*recipient))
        .collect();

    let recipient = match recipients.join(RECIPIENT_SEPARATOR) {
        joined if joined.is_empty() => UNKNOWN_RECIPIENT.to_string(),
        joined => joined,
    };

    let subject = if fields.subject.is_empty() {
        NO_SUBJECT.to_string()
    } else {
        fields.subject
    };

    OutboundMailEvent {
        agent_id: identity.agent_id.clone(),
        tenant_key: identity.tenant_key.clone(),
        sender: identity.sender.clone(),
        recipient,
        subject,
        body_preview: truncate_chars(&fields.body, BODY_PREVIEW_CHARS),
        has_attachments: false,
        attachment_names: String::new(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
