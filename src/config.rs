use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::context::{Rum, RumBuilder};
use crate::error::ContextError;

const CONFIG_CANDIDATES: &[(&str, ConfigFormat)] = &[
    ("rum.yml", ConfigFormat::Yaml),
    ("rum.yaml", ConfigFormat::Yaml),
    ("rum.toml", ConfigFormat::Toml),
];

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "RUM_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedContextConfig {
    pub path: PathBuf,
    pub data: ContextConfig,
}

/// Raw context values as written in `rum.yml` / `rum.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub workspace: Option<PathBuf>,
    #[serde(default)]
    pub project_domain: Option<String>,
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(skip)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, rename = "time")]
    raw_time: Option<RawTime>,
    #[serde(default)]
    pub core_version: Option<String>,
    #[serde(default)]
    pub document_root: Option<PathBuf>,
}

/// `time` as written in a config file: a string, or a native TOML datetime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawTime {
    Text(String),
    Native(toml::value::Datetime),
}

impl RawTime {
    fn into_text(self) -> String {
        match self {
            RawTime::Text(text) => text,
            RawTime::Native(datetime) => datetime.to_string(),
        }
    }
}

impl ContextConfig {
    /// Parses the file's `time` value the same way `RUM_TIME` is parsed.
    fn resolve_time(mut self) -> Result<Self, ContextError> {
        if let Some(raw) = self.raw_time.take() {
            self.time = Some(parse_time("config key `time`", &raw.into_text())?);
        }
        Ok(self)
    }

    /// Applies `RUM_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ContextError> {
        self.apply_overrides_with(read_env_var)
    }

    /// Applies overrides from `lookup`; unset or empty values are ignored.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<(), ContextError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            let value = lookup(key.as_str()).filter(|v| !v.trim().is_empty())?;
            debug!(%key, "environment override applied");
            Some((key, value))
        };

        if let Some((_, v)) = var("WORKSPACE") {
            self.workspace = Some(PathBuf::from(v));
        }
        if let Some((_, v)) = var("PROJECT_DOMAIN") {
            self.project_domain = Some(v);
        }
        if let Some((_, v)) = var("PROJECT_DIR") {
            self.project_dir = Some(PathBuf::from(v));
        }
        if let Some((_, v)) = var("PROJECT_NAME") {
            self.project_name = Some(v);
        }
        if let Some((_, v)) = var("HOST_NAME") {
            self.host_name = Some(v);
        }
        if let Some((_, v)) = var("OS") {
            self.os = Some(v);
        }
        if let Some((_, v)) = var("ENVIRONMENT") {
            self.environment = Some(v);
        }
        if let Some((key, v)) = var("TIME") {
            self.time = Some(parse_time(&key, &v)?);
        }
        if let Some((_, v)) = var("CORE_VERSION") {
            self.core_version = Some(v);
        }
        if let Some((_, v)) = var("DOCUMENT_ROOT") {
            self.document_root = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn into_builder(self) -> RumBuilder {
        let mut builder = Rum::builder();
        if let Some(v) = self.workspace {
            builder = builder.workspace(v);
        }
        if let Some(v) = self.project_domain {
            builder = builder.project_domain(v);
        }
        if let Some(v) = self.project_dir {
            builder = builder.project_dir(v);
        }
        if let Some(v) = self.project_name {
            builder = builder.project_name(v);
        }
        if let Some(v) = self.host_name {
            builder = builder.host_name(v);
        }
        if let Some(v) = self.os {
            builder = builder.os(v);
        }
        if let Some(v) = self.environment {
            builder = builder.environment(v);
        }
        if let Some(v) = self.time {
            builder = builder.time(v);
        }
        if let Some(v) = self.core_version {
            builder = builder.core_version(v);
        }
        if let Some(v) = self.document_root {
            builder = builder.document_root(v);
        }
        builder
    }

    pub fn into_context(self) -> Result<Rum, ContextError> {
        self.into_builder().build()
    }
}

fn read_env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            warn!(%key, "ignoring environment override that is not valid UTF-8");
            None
        }
    }
}

fn parse_time(source_name: &str, value: &str) -> Result<DateTime<Utc>, ContextError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ContextError::InvalidTime {
            source_name: source_name.to_string(),
            value: value.to_string(),
            source,
        })
}

pub fn load_context_config() -> Result<Option<LoadedContextConfig>> {
    let current_dir = std::env::current_dir().context("resolving current directory for config")?;
    load_context_config_from_dir(&current_dir)
}

pub fn load_context_config_from_dir(base_dir: &Path) -> Result<Option<LoadedContextConfig>> {
    for (file, format) in CONFIG_CANDIDATES {
        let path = base_dir.join(file);
        if !path.exists() {
            continue;
        }
        let data = read_config(&path, *format)?;
        info!(path = %path.display(), "loaded context config");
        return Ok(Some(LoadedContextConfig { path, data }));
    }
    debug!(dir = %base_dir.display(), "no context config found");
    Ok(None)
}

pub fn load_context_config_from_file(path: &Path) -> Result<LoadedContextConfig> {
    let data = read_config(path, ConfigFormat::from_path(path))?;
    info!(path = %path.display(), "loaded context config");
    Ok(LoadedContextConfig {
        path: path.to_path_buf(),
        data,
    })
}

/// Loads the config (explicit path or discovered), applies env overrides and
/// builds the context.
pub fn resolve_context(explicit: Option<&Path>) -> Result<Rum> {
    let mut data = match explicit {
        Some(path) => load_context_config_from_file(path)?.data,
        None => load_context_config()?
            .map(|loaded| loaded.data)
            .unwrap_or_default(),
    };
    data.apply_env_overrides()?;
    Ok(data.into_context()?)
}

fn read_config(path: &Path, format: ConfigFormat) -> Result<ContextConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading context config at {}", path.display()))?;
    let data = match format {
        ConfigFormat::Yaml => parse_yaml_str(&content)
            .with_context(|| format!("parsing YAML config at {}", path.display()))?,
        ConfigFormat::Toml => parse_toml_str(&content)
            .with_context(|| format!("parsing TOML config at {}", path.display()))?,
    };
    Ok(data)
}

pub(crate) fn parse_yaml_str(content: &str) -> Result<ContextConfig> {
    // An empty document deserializes as unit, not as a map.
    if content.trim().is_empty() {
        return Ok(ContextConfig::default());
    }
    let data: ContextConfig = serde_yaml::from_str(content)?;
    Ok(data.resolve_time()?)
}

pub(crate) fn parse_toml_str(content: &str) -> Result<ContextConfig> {
    let data: ContextConfig = toml::from_str(content)?;
    Ok(data.resolve_time()?)
}
