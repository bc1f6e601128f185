use super::{DraftFields, PlatformStrategy};
use crate::dom::{Dom, InteractionEvent};
use crate::platform::PlatformVariant;

/// Strategy for unrecognised hosts: never detects, never extracts.
pub struct InertStrategy;

impl<D: Dom> PlatformStrategy<D> for InertStrategy {
    fn variant(&self) -> PlatformVariant {
        PlatformVariant::Unknown
    }

    fn is_send_intent(&self, _dom: &D, _event: &InteractionEvent<D::Node>) -> bool {
        false
    }

    fn extract_fields(&self, _dom: &D) -> DraftFields {
        DraftFields::default()
    }
}
