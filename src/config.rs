use crate::event::Identity;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Collector endpoint and reporting identity.
///
/// Legacy agent `config.json` files use PascalCase keys; those are accepted
/// as aliases so an existing file loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "BackendUrl")]
    pub backend_url: String,
    #[serde(alias = "TenantApiKey")]
    pub tenant_api_key: String,
    #[serde(alias = "AgentId")]
    pub agent_id: String,
    pub sender: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: "http://localhost:8000".to_string(),
            tenant_api_key: String::new(),
            agent_id: "AGENT-CHROME-EXT".to_string(),
            sender: "BrowserUser".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path}"))?;
        Ok(())
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            let config = Self::from_file(path)?;
            log::info!(
                "Loaded configuration from {path} (agent {}, tenant key {})",
                config.agent_id,
                config.masked_tenant_key()
            );
            Ok(config)
        } else {
            log::warn!("Configuration file '{path}' not found, using default configuration");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.backend_url)
            .with_context(|| format!("Invalid backend URL: {}", self.backend_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Backend URL must use http or https: {}", self.backend_url);
        }
        if self.tenant_api_key.is_empty() {
            log::warn!("Tenant API key is empty; the collector will not attribute events");
        }
        if self.timeout_seconds == 0 {
            bail!("timeout_seconds must be greater than zero");
        }
        Ok(())
    }

    /// `<backend_url>/api/mail`.
    pub fn mail_endpoint(&self) -> anyhow::Result<Url> {
        let endpoint = format!("{}/api/mail", self.backend_url.trim_end_matches('/'));
        Url::parse(&endpoint).with_context(|| format!("Invalid mail endpoint: {endpoint}"))
    }

    pub fn identity(&self) -> Identity {
        Identity {
            agent_id: self.agent_id.clone(),
            tenant_key: self.tenant_api_key.clone(),
            sender: self.sender.clone(),
        }
    }

    /// Tenant key safe for log output.
    pub fn masked_tenant_key(&self) -> String {
        mask_secret(&self.tenant_api_key)
    }
}

pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}***")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let config = Config {
            tenant_api_key: "e7cd-1234".to_string(),
            ..Default::default()
        };
        config.to_file(path).unwrap();
        assert_eq!(Config::from_file(path).unwrap(), config);
    }

    #[test]
    fn test_legacy_json_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"BackendUrl": "https://collector.example", "TenantApiKey": "abcd-efgh", "AgentId": "HOST-42", "ScreenshotsEnabled": true}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.backend_url, "https://collector.example");
        assert_eq!(config.tenant_api_key, "abcd-efgh");
        assert_eq!(config.agent_id, "HOST-42");
        assert_eq!(config.sender, "BrowserUser");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/send-sentry.yaml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_mail_endpoint() {
        let mut config = Config::default();
        assert_eq!(
            config.mail_endpoint().unwrap().as_str(),
            "http://localhost:8000/api/mail"
        );

        config.backend_url = "https://collector.example/tenant-a/".to_string();
        assert_eq!(
            config.mail_endpoint().unwrap().as_str(),
            "https://collector.example/tenant-a/api/mail"
        );
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.backend_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.backend_url = "ftp://collector.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_tenant_key() {
        assert_eq!(mask_secret("e7cdae55-2e7e"), "e7cd***");
        assert_eq!(mask_secret("ab"), "ab***");
        assert_eq!(mask_secret(""), "(unset)");
    }
}
