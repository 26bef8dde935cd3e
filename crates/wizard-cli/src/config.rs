//! Loading `wizard.toml`.

use std::path::Path;

use anyhow::Context;
use wizard_types::config::WizardConfig;

/// Load the host configuration from `path`.
///
/// A missing file is not an error and yields defaults. An unreadable or
/// malformed file is returned as an error so the caller can warn once
/// logging is up and fall back to defaults.
pub async fn load_config(path: &Path) -> anyhow::Result<WizardConfig> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(WizardConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
