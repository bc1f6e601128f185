use super::{DraftFields, PlatformStrategy};
use crate::dom::{Dom, InteractionEvent};
use crate::platform::PlatformVariant;
use regex::Regex;

const SEND_TEXT: &str = "Send";
const SEND_SHORTCUT_TITLE: &str = "Send (Ctrl+Enter)";
const SEND_BUTTON: &str = r#"button[title="Send (Ctrl+Enter)"]"#;
const EDITABLE: &str = r#"[contenteditable="true"]"#;
// "To" itself or "To " + qualifier; a bare prefix would also match "Today" or "Tools".
const TO_WELL: &str = r#"[aria-label="To"], [aria-label^="To "]"#;

/// Substituted when no recipient could be read from the compose form.
pub const UNRESOLVED_RECIPIENT: &str = "(Outlook Web Recipient)";

pub struct OutlookStrategy {
    address_regex: Regex,
}

impl OutlookStrategy {
    pub fn new() -> Self {
        Self {
            address_regex: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
        }
    }

    /// Addresses typed into or rendered inside the "To" well.
    fn collect_recipients<D: Dom>(&self, dom: &D, fields: &mut DraftFields) {
        for well in dom.query_selector_all(TO_WELL) {
            let content = format!("{} {}", dom.value(well), dom.inner_text(well));
            for address in self.address_regex.find_iter(&content) {
                fields.add_recipient(address.as_str());
            }
        }
    }
}

impl Default for OutlookStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dom> PlatformStrategy<D> for OutlookStrategy {
    fn variant(&self) -> PlatformVariant {
        PlatformVariant::Outlook
    }

    fn is_send_intent(&self, dom: &D, event: &InteractionEvent<D::Node>) -> bool {
        let target = event.target;

        if dom.attribute(target, "title").as_deref() == Some(SEND_SHORTCUT_TITLE) {
            log::debug!("Outlook send matched on shortcut title");
            return true;
        }

        if dom.inner_text(target) == SEND_TEXT {
            log::debug!("Outlook send matched on button text");
            return true;
        }

        if dom.closest(target, SEND_BUTTON).is_some() {
            log::debug!("Outlook send matched on enclosing send button");
            return true;
        }

        false
    }

    fn extract_fields(&self, dom: &D) -> DraftFields {
        let mut fields = DraftFields::default();

        // Every qualifying node overwrites the previous one: the last match wins.
        for input in dom.query_selector_all("input") {
            let label = dom.attribute(input, "aria-label").unwrap_or_default();
            let placeholder = dom.attribute(input, "placeholder").unwrap_or_default();
            if label.contains("Subject") || placeholder.contains("Subject") {
                fields.subject = dom.value(input);
            }
        }

        for editable in dom.query_selector_all(EDITABLE) {
            let label = dom.attribute(editable, "aria-label").unwrap_or_default();
            let is_textbox = dom.attribute(editable, "role").as_deref() == Some("textbox");
            if label.to_lowercase().contains("body") || is_textbox {
                fields.body = dom.inner_text(editable);
            }
        }

        self.collect_recipients(dom, &mut fields);
        if fields.recipients.is_empty() {
            log::debug!("No Outlook recipient resolved, using placeholder");
            fields.recipients.push(UNRESOLVED_RECIPIENT.to_string());
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, EventKind, NodeId};

    fn click(target: NodeId) -> InteractionEvent<NodeId> {
        InteractionEvent::new(EventKind::Click, target)
    }

    #[test]
    fn test_shortcut_title_is_send_intent() {
        let mut doc = Document::new();
        let button = doc.append_element(None, "button", &[("title", "Send (Ctrl+Enter)")]);
        assert!(OutlookStrategy::new().is_send_intent(&doc, &click(button)));
    }

    #[test]
    fn test_icon_inside_titled_button_is_send_intent() {
        let mut doc = Document::new();
        let button = doc.append_element(None, "button", &[("title", "Send (Ctrl+Enter)")]);
        let icon = doc.append_element(Some(button), "i", &[("data-icon-name", "Send")]);
        assert!(OutlookStrategy::new().is_send_intent(&doc, &click(icon)));
    }

    #[test]
    fn test_untitled_send_text_is_send_intent() {
        let mut doc = Document::new();
        let div = doc.append_element(None, "div", &[]);
        doc.append_text(div, "Send");
        assert!(OutlookStrategy::new().is_send_intent(&doc, &click(div)));
    }

    #[test]
    fn test_other_buttons_are_not_send_intent() {
        let mut doc = Document::new();
        let button = doc.append_element(None, "button", &[("title", "Discard")]);
        doc.append_text(button, "Discard");
        assert!(!OutlookStrategy::new().is_send_intent(&doc, &click(button)));
    }

    #[test]
    fn test_last_matching_subject_and_body_win() {
        let doc = Document::parse_html(
            r#"<div>
                 <input aria-label="Subject" value="first">
                 <input placeholder="Add a Subject" value="second">
                 <input aria-label="Search" value="ignored">
                 <div contenteditable="true" aria-label="Message body">Draft one</div>
                 <div contenteditable="true" role="textbox">Draft two</div>
                 <div contenteditable="false" role="textbox">Not editable</div>
               </div>"#,
        );

        let fields = OutlookStrategy::new().extract_fields(&doc);
        assert_eq!(fields.subject, "second");
        assert_eq!(fields.body, "Draft two");
    }

    #[test]
    fn test_unresolved_recipient_placeholder() {
        let doc = Document::parse_html("<div></div>");
        let fields = OutlookStrategy::new().extract_fields(&doc);
        assert_eq!(fields.recipients, vec![UNRESOLVED_RECIPIENT]);
        assert_eq!(fields.subject, "");
        assert_eq!(fields.body, "");
    }

    #[test]
    fn test_recipients_from_to_well() {
        let doc = Document::parse_html(
            r#"<div aria-label="To">
                 <span>Dana Smith &lt;dana@corp.example&gt;</span>
                 <input aria-label="To recipients" value="ops@corp.example">
               </div>"#,
        );
        let fields = OutlookStrategy::new().extract_fields(&doc);
        assert!(fields.recipients.contains(&"dana@corp.example".to_string()));
        assert!(fields.recipients.contains(&"ops@corp.example".to_string()));
        assert!(!fields.recipients.contains(&UNRESOLVED_RECIPIENT.to_string()));
    }

    #[test]
    fn test_labels_starting_with_to_are_not_recipient_wells() {
        let doc = Document::parse_html(
            r#"<div>
                 <div aria-label="Today">Meeting with boss@corp.example</div>
                 <div aria-label="Toolbar">help@corp.example</div>
               </div>"#,
        );
        let fields = OutlookStrategy::new().extract_fields(&doc);
        assert_eq!(fields.recipients, vec![UNRESOLVED_RECIPIENT]);
    }
}
