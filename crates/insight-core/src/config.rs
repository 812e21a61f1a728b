use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::types::Credential;

/// Top-level configuration for an Insight widget instance.
///
/// Loaded from `~/.insight/config.toml` by the terminal host. Hosts that
/// embed the widget build it in code and hand it to `init`/`render`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

impl InsightConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: InsightConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Bot message seeded into every new session.
    pub greeting: String,
    /// Artificial latency of the local heuristic replies, in milliseconds.
    pub local_reply_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm your insights assistant. How can I help you today?".to_string(),
            local_reply_delay_ms: 500,
        }
    }
}

impl ChatConfig {
    pub fn local_reply_delay(&self) -> Duration {
        Duration::from_millis(self.local_reply_delay_ms)
    }
}

/// Remote chat endpoint settings.
///
/// The remote strategy is only active when a non-empty credential is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// URL receiving `POST { "query": ... }`.
    pub endpoint: String,
    /// Bearer credential; never defaulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/chat".to_string(),
            credential: None,
        }
    }
}

impl RemoteConfig {
    /// The configured credential, treating an empty value as absent.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref().filter(|c| !c.is_empty())
    }
}

/// Per-message feedback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// How long the "copied" indicator stays set, in milliseconds.
    pub copy_indicator_ms: u64,
    /// Optional URL receiving `POST { "text": ..., "index": ... }` on like/dislike.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_endpoint: Option<String>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            copy_indicator_ms: 2000,
            notify_endpoint: None,
        }
    }
}

impl FeedbackConfig {
    pub fn copy_indicator(&self) -> Duration {
        Duration::from_millis(self.copy_indicator_ms)
    }
}

/// Where copied text goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackend {
    /// In-process clipboard; nothing leaves the widget.
    #[default]
    Memory,
    /// The desktop clipboard.
    System,
}

/// Clipboard settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    pub backend: ClipboardBackend,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = InsightConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.chat.local_reply_delay_ms, 500);
        assert!(config.chat.greeting.starts_with("Hello!"));
        assert!(config.remote.credential.is_none());
        assert_eq!(config.feedback.copy_indicator_ms, 2000);
        assert!(config.feedback.notify_endpoint.is_none());
        assert_eq!(config.clipboard.backend, ClipboardBackend::Memory);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[chat]
greeting = "Hi there"
local_reply_delay_ms = 10

[remote]
endpoint = "https://chat.internal/ask"
credential = "key-0042"

[feedback]
copy_indicator_ms = 750
notify_endpoint = "https://chat.internal/feedback"

[clipboard]
backend = "system"
"#;
        let file = create_temp_config(content);
        let config = InsightConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.chat.greeting, "Hi there");
        assert_eq!(config.chat.local_reply_delay(), Duration::from_millis(10));
        assert_eq!(config.remote.endpoint, "https://chat.internal/ask");
        assert_eq!(config.remote.credential().unwrap().expose(), "key-0042");
        assert_eq!(config.feedback.copy_indicator(), Duration::from_millis(750));
        assert_eq!(
            config.feedback.notify_endpoint.as_deref(),
            Some("https://chat.internal/feedback")
        );
        assert_eq!(config.clipboard.backend, ClipboardBackend::System);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = InsightConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        // Remaining fields use defaults
        assert_eq!(config.chat.local_reply_delay_ms, 500);
        assert_eq!(config.feedback.copy_indicator_ms, 2000);
    }

    #[test]
    fn test_empty_credential_is_absent() {
        let content = r#"
[remote]
credential = ""
"#;
        let file = create_temp_config(content);
        let config = InsightConfig::load(file.path()).unwrap();
        assert!(config.remote.credential.is_some());
        assert!(config.remote.credential().is_none());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = InsightConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_unknown_clipboard_backend_is_rejected() {
        let file = create_temp_config("[clipboard]\nbackend = \"carrier-pigeon\"\n");
        let result = InsightConfig::load(file.path());
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is [not valid toml");
        let result = InsightConfig::load(file.path());
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = InsightConfig::default();
        config.remote.credential = Some(Credential::new("abc123"));
        config.save(&path).unwrap();

        let reloaded = InsightConfig::load(&path).unwrap();
        assert_eq!(reloaded.chat.greeting, config.chat.greeting);
        assert_eq!(reloaded.remote, config.remote);
    }

    #[test]
    fn test_save_keeps_clipboard_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = InsightConfig::default();
        config.clipboard.backend = ClipboardBackend::System;
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("backend = \"system\""));
        let reloaded = InsightConfig::load(&path).unwrap();
        assert_eq!(reloaded.clipboard.backend, ClipboardBackend::System);
    }
}
