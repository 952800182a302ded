mod config;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tikgrab_core::{GrabError, GrabResult, validate_url};

pub use config::{
    ApiConfig, DEFAULT_APIFY_ENDPOINT, DEFAULT_BIND, DEFAULT_PROXY_BASE, DEFAULT_TIKWM_BASE,
    DEFAULT_TIMEOUT_SECS, HttpConfig, ServerConfig, TikgrabConfig,
};

pub fn config_path() -> GrabResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GrabError::Config("home directory not found".to_string()))?;
    Ok(home.join(".tikgrab").join("config.toml"))
}

pub fn load_config() -> GrabResult<TikgrabConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> GrabResult<TikgrabConfig> {
    if !path.exists() {
        return Ok(TikgrabConfig::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|err| GrabError::Config(format!("failed to read config: {err}")))?;
    toml::from_str(&content)
        .map_err(|err| GrabError::Config(format!("failed to parse config: {err}")))
}

pub fn save_config(config: &TikgrabConfig) -> GrabResult<()> {
    save_config_to(&config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &TikgrabConfig) -> GrabResult<()> {
    ensure_parent(path)?;
    let content = toml::to_string_pretty(config)
        .map_err(|err| GrabError::Config(format!("failed to serialize config: {err}")))?;
    fs::write(path, content)
        .map_err(|err| GrabError::Config(format!("failed to write config: {err}")))
}

pub fn config_exists() -> GrabResult<bool> {
    Ok(config_path()?.exists())
}

/// Values the server and CLI run with, after environment overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub apify_token: Option<String>,
    pub apify_endpoint: String,
    pub tikwm_base: String,
    pub bind: String,
    pub proxy_base: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn resolve(config: &TikgrabConfig) -> GrabResult<Self> {
        Self::resolve_with(config, |key| env::var(key).ok())
    }

    pub fn resolve_with<F>(config: &TikgrabConfig, lookup: F) -> GrabResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        let timeout_secs = match from_env(&["TIKGRAB_TIMEOUT_SECS"]) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|err| {
                GrabError::Config(format!("invalid TIKGRAB_TIMEOUT_SECS '{raw}': {err}"))
            })?,
            None => config.http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(GrabError::Config("timeout must be at least 1 second".to_string()));
        }

        let settings = Self {
            apify_token: from_env(&["TIKGRAB_APIFY_TOKEN", "APIFY_API_TOKEN"])
                .or_else(|| non_blank(config.api.apify_token.as_deref())),
            apify_endpoint: from_env(&["TIKGRAB_APIFY_ENDPOINT"])
                .or_else(|| non_blank(config.api.apify_endpoint.as_deref()))
                .unwrap_or_else(|| DEFAULT_APIFY_ENDPOINT.to_string()),
            tikwm_base: from_env(&["TIKGRAB_TIKWM_BASE"])
                .or_else(|| non_blank(config.api.tikwm_base.as_deref()))
                .unwrap_or_else(|| DEFAULT_TIKWM_BASE.to_string()),
            bind: from_env(&["TIKGRAB_BIND"])
                .or_else(|| non_blank(config.server.bind.as_deref()))
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            proxy_base: from_env(&["TIKGRAB_PROXY_BASE"])
                .or_else(|| non_blank(config.server.proxy_base.as_deref()))
                .unwrap_or_else(|| DEFAULT_PROXY_BASE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        for (key, value) in [
            ("api.apify_endpoint", &settings.apify_endpoint),
            ("api.tikwm_base", &settings.tikwm_base),
            ("server.proxy_base", &settings.proxy_base),
        ] {
            validate_url(value).map_err(|err| GrabError::Config(format!("{key}: {err}")))?;
        }
        Ok(settings)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

pub fn get_config_value(config: &TikgrabConfig, key_path: &str) -> Option<String> {
    let parts: Vec<&str> = key_path.split('.').collect();

    match parts.as_slice() {
        ["api", "apify_token"] => config.api.apify_token.clone(),
        ["api", "apify_endpoint"] => config.api.apify_endpoint.clone(),
        ["api", "tikwm_base"] => config.api.tikwm_base.clone(),
        ["server", "bind"] => config.server.bind.clone(),
        ["server", "proxy_base"] => config.server.proxy_base.clone(),
        ["http", "timeout_secs"] => config.http.timeout_secs.map(|secs| secs.to_string()),
        _ => None,
    }
}

pub fn set_config_value(key_path: &str, value: &str) -> GrabResult<()> {
    set_config_value_at(&config_path()?, key_path, value)
}

pub fn set_config_value_at(path: &Path, key_path: &str, value: &str) -> GrabResult<()> {
    let content = if path.exists() {
        fs::read_to_string(path)
            .map_err(|err| GrabError::Config(format!("failed to read config: {err}")))?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .unwrap_or_default();

    let parts: Vec<&str> = key_path.split('.').collect();
    let Some((last_part, parents)) = parts.split_last().filter(|_| parts.len() >= 2) else {
        return Err(GrabError::Config(
            "key path must have at least 2 parts (e.g., 'api.apify_token')".to_string(),
        ));
    };

    let mut current = doc.as_table_mut();
    for part in parents {
        current = current
            .entry(part)
            .or_insert(toml_edit::Item::Table(Default::default()))
            .as_table_mut()
            .ok_or_else(|| {
                GrabError::Config(format!("cannot set nested value in '{key_path}'"))
            })?;
    }

    // timeout_secs is the only integer key; keep it typed so the file parses back
    current[*last_part] = match value.parse::<i64>() {
        Ok(number) if key_path == "http.timeout_secs" => toml_edit::value(number),
        _ => toml_edit::value(value),
    };

    ensure_parent(path)?;
    fs::write(path, doc.to_string())
        .map_err(|err| GrabError::Config(format!("failed to write config: {err}")))
}

pub fn open_in_editor() -> GrabResult<()> {
    let path = config_path()?;
    if !path.exists() {
        save_config(&TikgrabConfig::default())?;
    }

    let editor = editor_command(|key| env::var(key).ok());
    let (program, flags) = editor.split_once(' ').unwrap_or((editor.as_str(), ""));
    let status = Command::new(program)
        .args(flags.split_whitespace())
        .arg(&path)
        .status()
        .map_err(|err| GrabError::Config(format!("cannot launch '{editor}': {err}")))?;

    if !status.success() {
        return Err(GrabError::Config(format!("'{editor}' exited with {status}")));
    }
    Ok(())
}

/// `$VISUAL`, then `$EDITOR`, then the platform's stock editor.
fn editor_command<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(lookup)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| {
            if cfg!(windows) { "notepad" } else { "vi" }.to_string()
        })
}

fn ensure_parent(path: &Path) -> GrabResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| GrabError::Config(format!("failed to create config dir: {err}")))?;
    }
    Ok(())
}
