/// Configuration schema and defaults.
///
/// Sections: `[backend]`, `[chat]`, `[logging]`, `[display]`. Every field
/// has a built-in default, so a config file only needs the keys it changes.
use serde::{Deserialize, Serialize};

use crate::chat::conversation::DEFAULT_CONTACT_PHONE;
use crate::view::MutationPolicy;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Maps to `~/.ironlady/config.toml` and `.ironlady.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IronLadyConfig {
    pub backend: BackendConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// The participant-tracking REST backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, including the `/api` prefix.
    pub api_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    /// `refetch` or `reconcile`.
    pub mutation_policy: MutationPolicy,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 10_000,
            mutation_policy: MutationPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [chat]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    /// Number quoted in the fallback reply.
    pub contact_phone: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_ms: 30_000,
            contact_phone: DEFAULT_CONTACT_PHONE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write failure events to the JSONL log.
    pub enabled: bool,
    /// Log file. Empty means `~/.ironlady/events.jsonl`.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
    /// Default output format: `table`, `json` or `csv`.
    pub format: String,
    /// Width in cells of the longest chart bar.
    pub bar_width: usize,
    /// Rows shown in the dashboard's recent-enrollments table.
    pub recent_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            format: "table".to_string(),
            bar_width: 30,
            recent_limit: 10,
        }
    }
}

impl IronLadyConfig {
    /// Annotated default config written by `ironlady config init`.
    pub fn default_toml() -> String {
        r#"# ironlady configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (IRONLADY_*)
#   2. Project config (.ironlady.toml in current directory)
#   3. User global config (~/.ironlady/config.toml)
#   4. Built-in defaults

[backend]
api_url = "http://localhost:5000/api"   # IRONLADY_API_URL
timeout_ms = 10000                      # IRONLADY_TIMEOUT_MS
mutation_policy = "refetch"             # refetch | reconcile

[chat]
url = "http://localhost:8000"           # IRONLADY_CHAT_URL
timeout_ms = 30000
contact_phone = "+91-6360823123"

[logging]
enabled = true                          # IRONLADY_LOG=0 to disable
path = ""                               # empty: ~/.ironlady/events.jsonl

[display]
color = true                            # IRONLADY_COLOR / NO_COLOR
format = "table"                        # table | json | csv
bar_width = 30
recent_limit = 10
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_defaults() {
        let config: IronLadyConfig = toml::from_str(&IronLadyConfig::default_toml()).unwrap();
        assert_eq!(config, IronLadyConfig::default());
    }

    #[test]
    fn missing_sections_fall_back() {
        let config: IronLadyConfig = toml::from_str(
            r#"
[backend]
api_url = "http://admin.local/api"
"#,
        )
        .unwrap();
        assert_eq!(config.backend.api_url, "http://admin.local/api");
        assert_eq!(config.backend.timeout_ms, 10_000);
        assert_eq!(config.chat, ChatConfig::default());
    }

    #[test]
    fn mutation_policy_round_trips() {
        let config: IronLadyConfig =
            toml::from_str("[backend]\nmutation_policy = \"reconcile\"\n").unwrap();
        assert_eq!(config.backend.mutation_policy, MutationPolicy::Reconcile);
        let out = toml::to_string(&config).unwrap();
        assert!(out.contains("mutation_policy = \"reconcile\""));
    }
}
