//! Currency formatting
//!
//! Provides:
//! - `CurrencyFormatter` trait, the seam the tip calculator formats through
//! - `CurrencyFormat` with built-in locale presets
//! - Locale tag parsing and detection from the environment

use rust_decimal::{Decimal, RoundingStrategy};
use thousands::{digits, Separable, SeparatorPolicy};

/// Renders an amount as a currency string.
pub trait CurrencyFormatter {
    fn format(&self, amount: Decimal) -> String;
}

/// Where the currency symbol goes relative to the number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$10.00`
    Prefix,
    /// `10,00 €`
    Suffix,
}

/// Formatting rules for one currency in one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub position: SymbolPosition,
    /// Put a space between symbol and number
    pub spaced: bool,
    pub decimal_separator: String,
    /// Empty string disables grouping
    pub grouping_separator: String,
    /// Group sizes from the right; the last one repeats
    pub grouping: Vec<u8>,
    pub fraction_digits: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::en_us()
    }
}

impl CurrencyFormat {
    fn build(
        symbol: &str,
        position: SymbolPosition,
        spaced: bool,
        decimal_separator: &str,
        grouping_separator: &str,
        grouping: &[u8],
        fraction_digits: u32,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            position,
            spaced,
            decimal_separator: decimal_separator.to_string(),
            grouping_separator: grouping_separator.to_string(),
            grouping: grouping.to_vec(),
            fraction_digits,
        }
    }

    /// US dollar, `$1,234.56`
    pub fn en_us() -> Self {
        Self::build("$", SymbolPosition::Prefix, false, ".", ",", &[3], 2)
    }

    /// Pound sterling, `£1,234.56`
    pub fn en_gb() -> Self {
        Self::build("£", SymbolPosition::Prefix, false, ".", ",", &[3], 2)
    }

    /// Indian rupee with lakh grouping, `₹1,23,456.78`
    pub fn en_in() -> Self {
        Self::build("₹", SymbolPosition::Prefix, false, ".", ",", &[3, 2], 2)
    }

    /// Brazilian real, `R$ 1.234,56`
    pub fn pt_br() -> Self {
        Self::build("R$", SymbolPosition::Prefix, true, ",", ".", &[3], 2)
    }

    /// Euro (Germany), `1.234,56 €`
    pub fn de_de() -> Self {
        Self::build("€", SymbolPosition::Suffix, true, ",", ".", &[3], 2)
    }

    /// Euro (France), `1 234,56 €`
    pub fn fr_fr() -> Self {
        Self::build("€", SymbolPosition::Suffix, true, ",", " ", &[3], 2)
    }

    /// Japanese yen, no minor unit, `¥1,235`
    pub fn ja_jp() -> Self {
        Self::build("¥", SymbolPosition::Prefix, false, ".", ",", &[3], 0)
    }

    /// Look up a preset by locale tag (`pt-BR`, `pt_BR`, `pt_BR.UTF-8`)
    pub fn from_locale(tag: &str) -> Result<Self, LocaleError> {
        match normalize_locale(tag).as_str() {
            "en-us" | "en" => Ok(Self::en_us()),
            "en-gb" => Ok(Self::en_gb()),
            "en-in" => Ok(Self::en_in()),
            "pt-br" | "pt" => Ok(Self::pt_br()),
            "de-de" | "de" => Ok(Self::de_de()),
            "fr-fr" | "fr" => Ok(Self::fr_fr()),
            "ja-jp" | "ja" => Ok(Self::ja_jp()),
            _ => Err(LocaleError::Unsupported(tag.to_string())),
        }
    }

    /// Format for the locale the process runs under
    pub fn detect() -> Self {
        Self::detect_from(|key| std::env::var(key).ok())
    }

    /// Locale detection over an arbitrary variable lookup.
    ///
    /// Checks `LC_ALL`, `LC_MONETARY`, `LANG` in that order, skipping unset
    /// and empty values. `C`/`POSIX` and unsupported locales give `en-US`.
    pub fn detect_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let tag = ["LC_ALL", "LC_MONETARY", "LANG"]
            .iter()
            .filter_map(|key| lookup(*key))
            .find(|value| !value.trim().is_empty());

        match tag {
            Some(tag) => Self::from_locale(&tag).unwrap_or_else(|_| {
                tracing::debug!("No currency preset for locale {:?}, using en-US", tag);
                Self::en_us()
            }),
            None => Self::en_us(),
        }
    }

    fn group(&self, integer: &str) -> String {
        if self.grouping_separator.is_empty() || self.grouping.is_empty() {
            return integer.to_string();
        }
        integer.separate_by_policy(SeparatorPolicy {
            separator: &self.grouping_separator,
            groups: &self.grouping,
            digits: digits::ASCII_DECIMAL,
        })
    }
}

impl CurrencyFormatter for CurrencyFormat {
    fn format(&self, amount: Decimal) -> String {
        let rounded = amount
            .abs()
            .round_dp_with_strategy(self.fraction_digits, RoundingStrategy::MidpointNearestEven);

        // Scale may end up below fraction_digits (short input, or a mantissa
        // too wide to rescale), so pad the minor digits as text
        let digits = rounded.to_string();
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

        let mut number = self.group(integer);
        if self.fraction_digits > 0 {
            number.push_str(&self.decimal_separator);
            number.push_str(&format!(
                "{:0<width$}",
                fraction,
                width = self.fraction_digits as usize
            ));
        }

        let gap = if self.spaced { " " } else { "" };
        let body = match self.position {
            SymbolPosition::Prefix => format!("{}{}{}", self.symbol, gap, number),
            SymbolPosition::Suffix => format!("{}{}{}", number, gap, self.symbol),
        };

        if amount.is_sign_negative() && !rounded.is_zero() {
            format!("-{}", body)
        } else {
            body
        }
    }
}

/// Locale lookup error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    #[error("no currency format for locale {0:?}")]
    Unsupported(String),
}

/// `pt_BR.UTF-8@euro` -> `pt-br`
fn normalize_locale(tag: &str) -> String {
    let tag = tag.trim();
    let tag = tag.split(['.', '@']).next().unwrap_or(tag);
    tag.replace('_', "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_en_us() {
        let fmt = CurrencyFormat::en_us();
        assert_eq!(fmt.format(dec("10")), "$10.00");
        assert_eq!(fmt.format(dec("9.18")), "$9.18");
        assert_eq!(fmt.format(dec("1234567.891")), "$1,234,567.89");
        assert_eq!(fmt.format(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_half_even_rounding() {
        let fmt = CurrencyFormat::en_us();
        assert_eq!(fmt.format(dec("0.125")), "$0.12");
        assert_eq!(fmt.format(dec("0.135")), "$0.14");
        assert_eq!(fmt.format(dec("7.6575")), "$7.66");
    }

    #[test]
    fn test_suffix_locales() {
        assert_eq!(CurrencyFormat::de_de().format(dec("1234.5")), "1.234,50 €");
        assert_eq!(CurrencyFormat::fr_fr().format(dec("1234.5")), "1 234,50 €");
    }

    #[test]
    fn test_pt_br() {
        assert_eq!(CurrencyFormat::pt_br().format(dec("9.18")), "R$ 9,18");
        assert_eq!(CurrencyFormat::pt_br().format(dec("1000")), "R$ 1.000,00");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(CurrencyFormat::en_in().format(dec("123456.78")), "₹1,23,456.78");
    }

    #[test]
    fn test_zero_fraction_digits() {
        let fmt = CurrencyFormat::ja_jp();
        assert_eq!(fmt.format(dec("1234.56")), "¥1,235");
        assert_eq!(fmt.format(dec("3")), "¥3");
    }

    #[test]
    fn test_negative() {
        let fmt = CurrencyFormat::en_us();
        assert_eq!(fmt.format(dec("-5")), "-$5.00");
        assert_eq!(fmt.format(dec("-0.001")), "$0.00");
    }

    #[test]
    fn test_largest_amounts_keep_fraction_digits() {
        let fmt = CurrencyFormat::en_us();
        let two_e27 = Decimal::from_str("2000000000000000000000000000.0").unwrap();
        assert_eq!(
            fmt.format(two_e27),
            format!("$2{}.00", ",000".repeat(9))
        );
        assert_eq!(
            fmt.format(Decimal::MAX),
            "$79,228,162,514,264,337,593,543,950,335.00"
        );
    }

    #[test]
    fn test_max_fraction_digits_are_padded() {
        let fmt = CurrencyFormat {
            fraction_digits: 28,
            ..CurrencyFormat::en_us()
        };
        assert_eq!(fmt.format(dec("10")), format!("$10.{}", "0".repeat(28)));
        assert_eq!(fmt.format(dec("0.5")), format!("$0.5{}", "0".repeat(27)));
    }

    #[test]
    fn test_no_grouping() {
        let fmt = CurrencyFormat {
            grouping_separator: String::new(),
            ..CurrencyFormat::en_us()
        };
        assert_eq!(fmt.format(dec("1234567")), "$1234567.00");
    }

    #[test]
    fn test_from_locale() {
        assert_eq!(CurrencyFormat::from_locale("pt-BR"), Ok(CurrencyFormat::pt_br()));
        assert_eq!(CurrencyFormat::from_locale("pt_BR.UTF-8"), Ok(CurrencyFormat::pt_br()));
        assert_eq!(CurrencyFormat::from_locale("DE_de"), Ok(CurrencyFormat::de_de()));
        assert_eq!(
            CurrencyFormat::from_locale("xx-YY"),
            Err(LocaleError::Unsupported("xx-YY".to_string()))
        );
    }

    #[test]
    fn test_detect_precedence() {
        let env: HashMap<&str, &str> =
            [("LC_ALL", ""), ("LC_MONETARY", "de_DE.UTF-8"), ("LANG", "en_GB.UTF-8")]
                .into_iter()
                .collect();
        let fmt = CurrencyFormat::detect_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(fmt, CurrencyFormat::de_de());
    }

    #[test]
    fn test_detect_fallbacks() {
        assert_eq!(CurrencyFormat::detect_from(|_| None), CurrencyFormat::en_us());
        assert_eq!(
            CurrencyFormat::detect_from(|key| (key == "LANG").then(|| "C".to_string())),
            CurrencyFormat::en_us()
        );
    }
}
