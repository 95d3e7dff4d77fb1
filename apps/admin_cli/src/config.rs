use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, bail, Context};
use proposal_form::ToastPosition;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_endpoint: String,
    pub toast_position: ToastPosition,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8080/api".into(),
            toast_position: ToastPosition::TopRight,
        }
    }
}

/// Defaults, then `config_path` (if present), then environment variables.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("failed to parse '{}'", config_path.display()))?;
        apply_overrides(&mut settings, |key| file_cfg.get(key).cloned())?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;

    settings.api_endpoint = normalize_api_endpoint(&settings.api_endpoint)?;
    Ok(settings)
}

fn apply_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("api_endpoint") {
        settings.api_endpoint = v;
    }
    if let Some(v) = lookup("toast_position") {
        settings.toast_position = v.parse().map_err(|err: String| anyhow!(err))?;
    }
    Ok(())
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("API_ENDPOINT") {
        settings.api_endpoint = v;
    }
    if let Some(v) = lookup("APP__API_ENDPOINT") {
        settings.api_endpoint = v;
    }
    if let Some(v) = lookup("APP__TOAST_POSITION") {
        settings.toast_position = v.parse().map_err(|err: String| anyhow!(err))?;
    }
    Ok(())
}

pub fn normalize_api_endpoint(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Settings::default().api_endpoint);
    }

    let url = Url::parse(raw).with_context(|| format!("invalid api endpoint '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api endpoint must use http or https, got '{}'", url.scheme());
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
