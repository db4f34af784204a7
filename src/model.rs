use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The two viewer panels.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    #[default]
    Vector,
    Embedded,
}

impl Panel {
    pub fn title(self) -> &'static str {
        match self {
            Panel::Vector => "Vector DB",
            Panel::Embedded => "Embedded DB",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Panel::Vector => "vector",
            Panel::Embedded => "embedded",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub default_host: String,
    pub default_port: u16,
    pub row_limit: u32,
    // Delay before the automatic follow-up list load after connect/upload
    pub deferred_load_ms: u64,
    pub error_banner_secs: u64,
    pub success_banner_secs: u64,
    pub request_timeout_secs: u64,
    pub cancel_stale_deferred: bool,
    pub export_dir: PathBuf,
    // Logical widget names left unresolved by the registry
    pub hidden_widgets: Vec<String>,
    pub start_panel: Panel,
    pub theme: ThemeChoice,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            default_host: "localhost".to_string(),
            default_port: 19530,
            row_limit: 100,
            deferred_load_ms: 1000,
            error_banner_secs: 5,
            success_banner_secs: 3,
            request_timeout_secs: 30,
            cancel_stale_deferred: true,
            export_dir: PathBuf::from("."),
            hidden_widgets: vec![],
            start_panel: Panel::Vector,
            theme: ThemeChoice::Dark,
        }
    }
}

pub(crate) fn validate_app_config(cfg: &AppConfig) -> Result<(), String> {
    let base = cfg.api_base.trim();
    if base.is_empty() {
        return Err("api_base must not be empty".to_string());
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(format!("api_base '{base}' must start with http:// or https://"));
    }
    if cfg.row_limit == 0 || cfg.row_limit > 10_000 {
        return Err(format!(
            "row_limit {} out of range (1..=10000)",
            cfg.row_limit
        ));
    }
    if cfg.default_port == 0 {
        return Err("default_port must be non-zero".to_string());
    }
    Ok(())
}

pub(crate) fn parse_config(text: &str) -> Result<AppConfig> {
    if text.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let cfg: AppConfig = serde_yaml::from_str(text).context("parsing config YAML")?;
    Ok(cfg)
}

pub(crate) fn apply_env_overrides(cfg: &mut AppConfig, api_base: Option<String>) {
    if let Some(base) = api_base {
        let base = base.trim();
        if !base.is_empty() {
            cfg.api_base = base.trim_end_matches('/').to_string();
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("DB_VIEWER_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let local = Path::new("db-viewer.yaml");
    if local.exists() {
        return Some(local.to_path_buf());
    }
    None
}

/// Load config from `$DB_VIEWER_CONFIG` or `./db-viewer.yaml`, falling back to defaults.
pub fn load_config() -> Result<AppConfig> {
    let mut cfg = match config_path() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_config(&text)?
        }
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut cfg, std::env::var("DB_VIEWER_API_BASE").ok());
    cfg.api_base = cfg.api_base.trim_end_matches('/').to_string();
    validate_app_config(&cfg).map_err(|e| anyhow::anyhow!("invalid config: {e}"))?;
    Ok(cfg)
}
