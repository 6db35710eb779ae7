use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_timeblock_home, timeblock_home};

pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const WEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub weather: WeatherSection,
    #[serde(default)]
    pub schedule: ScheduleSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Used when `OPENAI_API_KEY` is not set.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub base_url: String,
    pub units: String,
    pub timeout_secs: u64,
    pub rain_extra_minutes: u32,
    pub snow_extra_minutes: u32,
    /// Used when `OPENWEATHER_API_KEY` is not set.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    pub commute_minutes: u32,
    pub timezone: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            units: "metric".to_string(),
            timeout_secs: 10,
            rain_extra_minutes: 10,
            snow_extra_minutes: 15,
            api_key: None,
        }
    }
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            commute_minutes: 30,
            timezone: "America/Chicago".to_string(),
        }
    }
}

impl LlmSection {
    pub fn api_key(&self) -> Option<String> {
        key_from_env_or(OPENAI_KEY_ENV, self.api_key.as_deref())
    }
}

impl WeatherSection {
    pub fn api_key(&self) -> Option<String> {
        key_from_env_or(WEATHER_KEY_ENV, self.api_key.as_deref())
    }
}

/// Environment wins; placeholder values left over from templates count as unset.
fn key_from_env_or(var: &str, fallback: Option<&str>) -> Option<String> {
    pick_key(std::env::var(var).ok(), fallback)
}

/// An empty or placeholder environment value falls through to the config key.
fn pick_key(env: Option<String>, fallback: Option<&str>) -> Option<String> {
    let usable = |k: &str| {
        let k = k.trim();
        (!k.is_empty() && !k.starts_with("your_")).then(|| k.to_string())
    };
    env.as_deref()
        .and_then(usable)
        .or_else(|| fallback.and_then(usable))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(timeblock_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_timeblock_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
