use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::currency::CurrencyFormat;
use crate::tip::{TipCalculator, TipTier, DEFAULT_MESSAGE};
use crate::ui::theme::{parse_hex_color, Theme};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calculator: CalculatorConfig,
    pub currency: CurrencyConfig,
    pub appearance: AppearanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Tier selected at startup: "20", "18", "15" (or names); unknown means 15
    pub default_tier: Option<String>,
    /// Initial state of the round-up switch
    pub round_up: bool,
    /// Result message, `{amount}` is replaced with the formatted tip
    pub message: String,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_tier: None,
            round_up: false,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Locale tag such as "en-US" or "pt_BR.UTF-8"; detected from the environment if unset
    pub locale: Option<String>,
    /// Override the locale's currency symbol
    pub symbol: Option<String>,
    /// Override the locale's number of minor-unit digits
    pub fraction_digits: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Theme preset name
    pub theme: String,
    /// Optional hex accent color overriding the preset's
    pub accent: Option<String>,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            accent: None,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("tiptime")
            .join("config.toml")
    }

    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Tier the radio group starts on
    pub fn default_tier(&self) -> TipTier {
        TipTier::resolve(self.calculator.default_tier.as_deref())
    }

    /// Currency format from locale (configured or detected) plus overrides
    pub fn resolve_currency(&self) -> CurrencyFormat {
        let mut format = match self.currency.locale.as_deref() {
            Some(locale) => CurrencyFormat::from_locale(locale).unwrap_or_else(|e| {
                tracing::warn!("{}, using en-US", e);
                CurrencyFormat::en_us()
            }),
            None => CurrencyFormat::detect(),
        };

        if let Some(ref symbol) = self.currency.symbol {
            format.symbol = symbol.clone();
        }
        if let Some(digits) = self.currency.fraction_digits {
            format.fraction_digits = digits.min(MAX_FRACTION_DIGITS);
        }

        format
    }

    pub fn calculator(&self) -> TipCalculator<CurrencyFormat> {
        TipCalculator::new(self.resolve_currency()).with_template(self.calculator.message.clone())
    }

    /// Theme preset with the accent override applied
    pub fn resolve_theme(&self) -> Theme {
        let mut theme = Theme::from_preset(&self.appearance.theme).unwrap_or_else(|| {
            tracing::warn!("Unknown theme {:?}, using default", self.appearance.theme);
            Theme::default()
        });

        if let Some(ref accent) = self.appearance.accent {
            match parse_hex_color(accent) {
                Ok(color) => theme.accent = color,
                Err(e) => tracing::warn!("Ignoring accent {:?}: {}", accent, e),
            }
        }

        theme
    }
}

/// `Decimal` cannot hold more than 28 fractional digits
const MAX_FRACTION_DIGITS: u32 = 28;
