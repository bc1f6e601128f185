use super::{DraftFields, PlatformStrategy};
use crate::dom::{Dom, InteractionEvent};
use crate::platform::PlatformVariant;

const SEND_TEXT: &str = "Send";
const SEND_CONTROL: &str = r#"[role="button"][aria-label*="Send"]"#;
const TO_FIELD: &str = r#"input[name="to"]"#;
const RECIPIENT_CHIP: &str = "[data-hovercard-id]";
const SUBJECT_BOX: &str = r#"input[name="subjectbox"]"#;
const MESSAGE_BODY: &str = r#"[aria-label="Message Body"]"#;

pub struct GmailStrategy;

impl<D: Dom> PlatformStrategy<D> for GmailStrategy {
    fn variant(&self) -> PlatformVariant {
        PlatformVariant::Gmail
    }

    fn is_send_intent(&self, dom: &D, event: &InteractionEvent<D::Node>) -> bool {
        let target = event.target;

        if dom.inner_text(target) == SEND_TEXT
            && dom.attribute(target, "role").as_deref() == Some("button")
        {
            log::debug!("Gmail send matched on button text");
            return true;
        }

        if dom
            .attribute(target, "aria-label")
            .is_some_and(|label| label.starts_with(SEND_TEXT))
        {
            log::debug!("Gmail send matched on aria-label");
            return true;
        }

        if dom.closest(target, SEND_CONTROL).is_some() {
            log::debug!("Gmail send matched on enclosing send control");
            return true;
        }

        false
    }

    fn extract_fields(&self, dom: &D) -> DraftFields {
        let mut fields = DraftFields::default();

        for input in dom.query_selector_all(TO_FIELD) {
            fields.add_recipient(&dom.value(input));
        }

        // Recipient chips carry the address in their hover-card id.
        for chip in dom.query_selector_all(RECIPIENT_CHIP) {
            if let Some(address) = dom.attribute(chip, "data-hovercard-id") {
                if address.contains('@') {
                    fields.add_recipient(&address);
                }
            }
        }

        if let Some(subject) = dom.query_selector(SUBJECT_BOX) {
            fields.subject = dom.value(subject);
        }

        if let Some(body) = dom.query_selector(MESSAGE_BODY) {
            fields.body = dom.inner_text(body);
        }

        fields
    }
}
