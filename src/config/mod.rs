/// Configuration for ironlady.
///
/// Layers, lowest precedence first:
///
/// 1. **Built-in defaults**: [`schema::IronLadyConfig::default()`]
/// 2. **User global config**: `~/.ironlady/config.toml`
/// 3. **Project local config**: `.ironlady.toml` in the current directory
/// 4. **Environment variables**: `IRONLADY_*`
///
/// File layers merge key by key: a file that sets only `backend.api_url`
/// keeps every other value from the layers below it. Malformed files are
/// skipped.
///
/// # Usage
///
/// ```rust,ignore
/// let cfg = ironlady::config::load();
/// let backend = HttpBackend::new(&cfg.backend.api_url, cfg.backend_timeout());
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

pub use schema::IronLadyConfig;

use crate::view::MutationPolicy;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration: defaults → global file → project
/// file → environment.
pub fn load() -> IronLadyConfig {
    let files: Vec<PathBuf> = [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
        .collect();
    let mut config = load_layers(&files);
    apply_env_overrides(&mut config);
    config
}

/// Defaults with each existing, well-formed TOML file in `files` merged on
/// top, in order.
pub fn load_layers(files: &[PathBuf]) -> IronLadyConfig {
    let Ok(mut merged) = toml::Value::try_from(IronLadyConfig::default()) else {
        return IronLadyConfig::default();
    };

    for path in files {
        if let Some(layer) = read_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // A layer that does not fit the schema is ignored as a whole.
    value.clone().try_into::<IronLadyConfig>().ok()?;
    Some(value)
}

/// Merge `overlay` into `base`: tables recurse, everything else replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

impl IronLadyConfig {
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.timeout_ms)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat.timeout_ms)
    }

    /// Where failure events go, or `None` when logging is off.
    pub fn event_log_path(&self) -> Option<PathBuf> {
        if !self.logging.enabled {
            return None;
        }
        if self.logging.path.trim().is_empty() {
            crate::analytics::events::default_log_path()
        } else {
            Some(PathBuf::from(self.logging.path.trim()))
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ironlady").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".ironlady.toml"))
}

/// Path to the global config file, for display and `config init`.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `IRONLADY_*` overrides (highest precedence layer).
///
/// - `IRONLADY_API_URL`: admin backend base URL
/// - `IRONLADY_CHAT_URL`: chat backend base URL
/// - `IRONLADY_TIMEOUT_MS`: admin backend request timeout
/// - `IRONLADY_MUTATION_POLICY`: `refetch` or `reconcile`
/// - `IRONLADY_LOG`: `0`/`false` disables the event log, `1`/`true`
///   enables it, anything else is taken as the log file path
/// - `IRONLADY_COLOR`: colored output on/off; `NO_COLOR` turns it off
pub fn apply_env_overrides(config: &mut IronLadyConfig) {
    if let Ok(val) = std::env::var("IRONLADY_API_URL")
        && !val.is_empty()
    {
        config.backend.api_url = val;
    }
    if let Ok(val) = std::env::var("IRONLADY_CHAT_URL")
        && !val.is_empty()
    {
        config.chat.url = val;
    }
    if let Ok(val) = std::env::var("IRONLADY_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("IRONLADY_MUTATION_POLICY")
        && let Some(policy) = MutationPolicy::parse(&val)
    {
        config.backend.mutation_policy = policy;
    }
    if let Ok(val) = std::env::var("IRONLADY_LOG") {
        if is_truthy(&val) {
            config.logging.enabled = true;
        } else if is_falsy(&val) {
            config.logging.enabled = false;
        } else {
            config.logging.enabled = true;
            config.logging.path = val;
        }
    }
    if std::env::var_os("NO_COLOR").is_some() {
        config.display.color = false;
    }
    if let Ok(val) = std::env::var("IRONLADY_COLOR") {
        config.display.color = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn is_falsy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.ironlady/config.toml`.
///
/// Fails if the file exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.ironlady/ directory")?;
    }

    fs::write(&path, IronLadyConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set one dotted key (e.g. `backend.api_url`) in the global config file.
///
/// The existing file is merged over the defaults first, so keys it does not
/// mention can still be set. The value is parsed according to the type of
/// the current value, and the result must still be a valid config.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root =
        toml::Value::try_from(IronLadyConfig::default()).context("failed to serialize defaults")?;
    if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        let current: toml::Value =
            toml::from_str(&content).context("failed to parse config as TOML value")?;
        merge_values(&mut root, current);
    }

    set_toml_value(&mut root, key, value)?;
    root.clone()
        .try_into::<IronLadyConfig>()
        .with_context(|| format!("invalid value for '{key}': '{value}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        None => anyhow::bail!("config key not found: '{key}'"),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// The effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn scratch(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_files_gives_defaults() {
        let config = load_layers(&[PathBuf::from("/nonexistent/ironlady.toml")]);
        assert_eq!(config, IronLadyConfig::default());
    }

    #[test]
    fn layers_merge_per_key() {
        let dir = tempdir().unwrap();
        let global = scratch(
            &dir,
            "global.toml",
            "[backend]\napi_url = \"http://global/api\"\ntimeout_ms = 2000\n",
        );
        let project = scratch(&dir, "project.toml", "[backend]\ntimeout_ms = 500\n");

        let config = load_layers(&[global, project]);
        assert_eq!(config.backend.api_url, "http://global/api");
        assert_eq!(config.backend.timeout_ms, 500);
        assert_eq!(config.chat.url, "http://localhost:8000");
    }

    #[test]
    fn malformed_layer_is_skipped() {
        let dir = tempdir().unwrap();
        let good = scratch(&dir, "good.toml", "[display]\nbar_width = 12\n");
        let bad = scratch(&dir, "bad.toml", "[display\nbar_width = ");
        let wrong_type = scratch(&dir, "wrong.toml", "[display]\nbar_width = \"wide\"\n");

        let config = load_layers(&[good, bad, wrong_type]);
        assert_eq!(config.display.bar_width, 12);
    }

    #[test]
    fn event_log_path_follows_logging_section() {
        let mut config = IronLadyConfig::default();
        config.logging.path = "/tmp/il/events.jsonl".into();
        assert_eq!(
            config.event_log_path(),
            Some(PathBuf::from("/tmp/il/events.jsonl"))
        );
        config.logging.enabled = false;
        assert_eq!(config.event_log_path(), None);
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
        assert!(is_falsy("off"));
        assert!(!is_falsy("/var/log/il.jsonl"));
    }

    #[test]
    fn set_toml_value_keeps_types() {
        let mut root = toml::Value::try_from(IronLadyConfig::default()).unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "2500").unwrap();
        set_toml_value(&mut root, "display.color", "no").unwrap();
        set_toml_value(&mut root, "backend.mutation_policy", "reconcile").unwrap();

        let config: IronLadyConfig = root.try_into().unwrap();
        assert_eq!(config.backend.timeout_ms, 2500);
        assert!(!config.display.color);
        assert_eq!(config.backend.mutation_policy, MutationPolicy::Reconcile);
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root = toml::Value::try_from(IronLadyConfig::default()).unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.nope", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.timeout_ms", "soon").is_err());
    }
}
