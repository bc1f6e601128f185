use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported web mail clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformVariant {
    Gmail,
    Outlook,
    Unknown,
}

/// Host fragments checked in order; first containing match wins.
const HOST_REGISTRY: &[(&str, PlatformVariant)] = &[
    ("google.com", PlatformVariant::Gmail),
    ("outlook", PlatformVariant::Outlook),
];

/// Classify a page host name into a platform variant.
pub fn identify(host: &str) -> PlatformVariant {
    let host = host.to_lowercase();
    HOST_REGISTRY
        .iter()
        .find(|(fragment, _)| host.contains(fragment))
        .map(|(_, variant)| *variant)
        .unwrap_or(PlatformVariant::Unknown)
}

impl fmt::Display for PlatformVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformVariant::Gmail => "gmail",
            PlatformVariant::Outlook => "outlook",
            PlatformVariant::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_known_hosts() {
        assert_eq!(identify("mail.google.com"), PlatformVariant::Gmail);
        assert_eq!(identify("outlook.office.com"), PlatformVariant::Outlook);
        assert_eq!(identify("outlook.live.com"), PlatformVariant::Outlook);
        assert_eq!(identify("Mail.Google.com"), PlatformVariant::Gmail);
    }

    #[test]
    fn test_identify_unknown_host() {
        assert_eq!(identify("example.com"), PlatformVariant::Unknown);
        assert_eq!(identify(""), PlatformVariant::Unknown);
    }
}
