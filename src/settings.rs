use std::path::PathBuf;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};
use crate::pricing::PricingConfig;
use crate::steps::FormConfig;
use crate::wizard::BackPolicy;

pub const TERMS_URL_ENV: &str = "CHECKOUT_TERMS_URL";

const MAX_EXPIRY_YEARS_AHEAD: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_price_per_gb_month")]
    pub price_per_gb_month: f64,
    #[serde(default = "default_upfront_discount_factor")]
    pub upfront_discount_factor: f64,
    #[serde(default = "default_expiry_years_ahead")]
    pub expiry_years_ahead: u32,
    #[serde(default)]
    pub terms_url: String,
    /// Reset the slice of the step being left when navigating back.
    #[serde(default = "default_clear_on_back")]
    pub clear_on_back: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_price_per_gb_month() -> f64 {
    2.0
}

fn default_upfront_discount_factor() -> f64 {
    0.9
}

fn default_expiry_years_ahead() -> u32 {
    50
}

fn default_clear_on_back() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            price_per_gb_month: default_price_per_gb_month(),
            upfront_discount_factor: default_upfront_discount_factor(),
            expiry_years_ahead: default_expiry_years_ahead(),
            terms_url: String::new(),
            clear_on_back: default_clear_on_back(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            price_per_gb_month: self.price_per_gb_month,
            upfront_discount_factor: self.upfront_discount_factor,
        }
    }

    pub fn back_policy(&self) -> BackPolicy {
        if self.clear_on_back {
            BackPolicy::ClearLeft
        } else {
            BackPolicy::Keep
        }
    }

    pub fn form_config(&self) -> FormConfig {
        FormConfig {
            current_year: chrono::Local::now().year(),
            expiry_years_ahead: self.expiry_years_ahead.clamp(1, MAX_EXPIRY_YEARS_AHEAD),
        }
    }

    /// Text for the terms link. An unset URL degrades to a placeholder.
    pub fn terms_link(&self) -> String {
        if self.terms_url.trim().is_empty() {
            "(terms link unavailable)".to_string()
        } else {
            self.terms_url.clone()
        }
    }

    fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(TERMS_URL_ENV) {
            self.terms_url = url;
        }
        self
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("checkout")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Effective settings: the settings file (or defaults) with environment overrides.
pub fn load_settings() -> Settings {
    read_settings().apply_env()
}

fn read_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CheckoutError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}
