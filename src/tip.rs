//! Tip calculation.
//!
//! # Data Model
//!
//! ```text
//! raw cost text ──parse──▶ BillAmount ─┐
//!                                      ├──▶ tip = bill * fraction ──(ceil?)──▶ formatter ──▶ TipResult
//! TipTier ──────fraction───────────────┘
//! ```
//!
//! Unparseable cost text is not an error. It produces `TipResult::NoValue`,
//! which displays as an empty string so the caller clears the previous
//! result.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::currency::CurrencyFormatter;

/// Placeholder substituted with the formatted tip in message templates
pub const AMOUNT_PLACEHOLDER: &str = "{amount}";

/// Message template used when none is configured
pub const DEFAULT_MESSAGE: &str = "Tip Amount: {amount}";

/// One of the three fixed tip percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TipTier {
    /// 20%
    Twenty,
    /// 18%
    Eighteen,
    /// 15%, also used when nothing (or something unknown) is selected
    #[default]
    Fifteen,
}

impl TipTier {
    /// All tiers in display order
    pub const ALL: [TipTier; 3] = [TipTier::Twenty, TipTier::Eighteen, TipTier::Fifteen];

    /// Fraction of the bill this tier tips
    pub fn fraction(self) -> Decimal {
        match self {
            TipTier::Twenty => Decimal::new(20, 2),
            TipTier::Eighteen => Decimal::new(18, 2),
            TipTier::Fifteen => Decimal::new(15, 2),
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            TipTier::Twenty => 20,
            TipTier::Eighteen => 18,
            TipTier::Fifteen => 15,
        }
    }

    /// Radio button label
    pub fn label(self) -> &'static str {
        match self {
            TipTier::Twenty => "Amazing service (20%)",
            TipTier::Eighteen => "Good service (18%)",
            TipTier::Fifteen => "OK service (15%)",
        }
    }

    /// Resolve a selection, falling back to 15% when nothing matches
    pub fn resolve(selection: Option<&str>) -> TipTier {
        let Some(raw) = selection else {
            return TipTier::default();
        };
        raw.parse().unwrap_or_else(|e: ParseTierError| {
            tracing::warn!("{}, using {}%", e, TipTier::default().percent());
            TipTier::default()
        })
    }

    /// Next tier in display order (wraps)
    pub fn next(self) -> TipTier {
        let i = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous tier in display order (wraps)
    pub fn previous(self) -> TipTier {
        let i = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl FromStr for TipTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "20" | "20%" | "twenty" | "amazing" => Ok(TipTier::Twenty),
            "18" | "18%" | "eighteen" | "good" => Ok(TipTier::Eighteen),
            "15" | "15%" | "fifteen" | "ok" | "okay" | "default" => Ok(TipTier::Fifteen),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}

/// Unknown tip tier name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tip tier {0:?}")]
pub struct ParseTierError(pub String);

/// Why cost text is not a bill amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseBillError {
    #[error("empty cost")]
    Empty,
    #[error("not a number: {0:?}")]
    Malformed(String),
    #[error("negative cost: {0}")]
    Negative(Decimal),
}

/// Non-negative bill amount parsed from user text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BillAmount(Decimal);

impl BillAmount {
    pub fn new(value: Decimal) -> Result<Self, ParseBillError> {
        if value.is_zero() {
            Ok(Self(Decimal::ZERO))
        } else if value.is_sign_negative() {
            Err(ParseBillError::Negative(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Parse user text; `None` means "no value", not zero
    #[cfg(test)]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for BillAmount {
    type Err = ParseBillError;

    /// Plain decimal or scientific notation, surrounding whitespace ignored.
    /// No grouping separators, currency symbols or locale decimal commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseBillError::Empty);
        }
        let malformed = || ParseBillError::Malformed(s.to_string());

        if !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        {
            return Err(malformed());
        }

        let value = if s.contains(['e', 'E']) {
            Decimal::from_scientific(s).map_err(|_| malformed())?
        } else {
            Decimal::from_str(s).map_err(|_| malformed())?
        };

        Self::new(value)
    }
}

/// Tip for a bill, before formatting.
///
/// `None` only when the product does not fit in a `Decimal`.
pub fn tip_amount(bill: BillAmount, tier: TipTier, round_up: bool) -> Option<Decimal> {
    let tip = bill.value().checked_mul(tier.fraction())?;
    Some(if round_up { tip.ceil() } else { tip })
}

/// Outcome of one calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TipResult {
    Amount {
        /// Unformatted tip (already ceiled when rounding up)
        tip: Decimal,
        /// Tip rendered by the currency formatter
        formatted: String,
        /// Formatted tip embedded in the message template
        message: String,
    },
    /// Cost text did not parse; clear the display
    NoValue,
}

impl TipResult {
    /// Text for the result display; empty for `NoValue`
    pub fn display_text(&self) -> &str {
        match self {
            TipResult::Amount { message, .. } => message,
            TipResult::NoValue => "",
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, TipResult::NoValue)
    }
}

/// Stateless calculator: a currency formatter plus a message template
#[derive(Debug, Clone)]
pub struct TipCalculator<F> {
    formatter: F,
    template: String,
}

impl<F: CurrencyFormatter> TipCalculator<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            formatter,
            template: DEFAULT_MESSAGE.to_string(),
        }
    }

    /// Replace the message template; `{amount}` marks where the tip goes
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    /// Compute the tip for raw cost text.
    pub fn compute(&self, raw_cost: &str, tier: TipTier, round_up: bool) -> TipResult {
        let bill = match raw_cost.parse::<BillAmount>() {
            Ok(bill) => bill,
            Err(e) => {
                tracing::debug!("No tip for {:?}: {}", raw_cost, e);
                return TipResult::NoValue;
            }
        };

        let Some(tip) = tip_amount(bill, tier, round_up) else {
            tracing::warn!("Tip for {} overflows", bill.value());
            return TipResult::NoValue;
        };

        let formatted = self.formatter.format(tip);
        let message = self.template.replace(AMOUNT_PLACEHOLDER, &formatted);
        tracing::debug!(%tier, round_up, %tip, "Calculated tip");

        TipResult::Amount {
            tip,
            formatted,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyFormat;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn calculator() -> TipCalculator<CurrencyFormat> {
        TipCalculator::new(CurrencyFormat::en_us())
    }

    /// Formatter that exposes exactly what it was handed
    struct Raw;

    impl CurrencyFormatter for Raw {
        fn format(&self, amount: Decimal) -> String {
            amount.normalize().to_string()
        }
    }

    #[test]
    fn test_twenty_percent() {
        let result = calculator().compute("50.00", TipTier::Twenty, false);
        assert_eq!(result.display_text(), "Tip Amount: $10.00");
    }

    #[test]
    fn test_round_up_integral_tip_unchanged() {
        let result = calculator().compute("50.00", TipTier::Twenty, true);
        assert_eq!(result.display_text(), "Tip Amount: $10.00");
    }

    #[test]
    fn test_round_up_ceils() {
        let result = calculator().compute("51.00", TipTier::Eighteen, true);
        match result {
            TipResult::Amount { tip, formatted, .. } => {
                assert_eq!(tip, dec("10"));
                assert_eq!(formatted, "$10.00");
            }
            TipResult::NoValue => panic!("expected an amount"),
        }
    }

    #[test]
    fn test_without_round_up_formatter_gets_exact_tip() {
        let calc = TipCalculator::new(Raw);
        assert_eq!(calc.compute("51.00", TipTier::Eighteen, false).display_text(), "Tip Amount: 9.18");
        assert_eq!(calc.compute("10.01", TipTier::Fifteen, false).display_text(), "Tip Amount: 1.5015");
    }

    #[test]
    fn test_default_tier() {
        let result = calculator().compute("20", TipTier::default(), false);
        assert_eq!(result.display_text(), "Tip Amount: $3.00");
    }

    #[test]
    fn test_no_value() {
        let calc = calculator();
        assert_eq!(calc.compute("abc", TipTier::Fifteen, false), TipResult::NoValue);
        assert_eq!(calc.compute("", TipTier::Eighteen, true), TipResult::NoValue);
        for raw in ["   ", "1,000", "$50", "1_000", "NaN", "inf", "5..0", "-10", "12abc"] {
            for tier in TipTier::ALL {
                for round_up in [false, true] {
                    let result = calc.compute(raw, tier, round_up);
                    assert!(result.is_no_value(), "{:?} should give no value", raw);
                    assert_eq!(result.display_text(), "");
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let calc = calculator();
        let first = calc.compute("123.45", TipTier::Eighteen, false);
        let second = calc.compute("123.45", TipTier::Eighteen, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fraction_table() {
        let bill = BillAmount::parse("100").unwrap();
        assert_eq!(tip_amount(bill, TipTier::Twenty, false), Some(dec("20")));
        assert_eq!(tip_amount(bill, TipTier::Eighteen, false), Some(dec("18")));
        assert_eq!(tip_amount(bill, TipTier::Fifteen, false), Some(dec("15")));
    }

    #[test]
    fn test_ceil_of_small_tip() {
        let bill = BillAmount::parse("0.10").unwrap();
        assert_eq!(tip_amount(bill, TipTier::Fifteen, true), Some(dec("1")));
        let zero = BillAmount::parse("0").unwrap();
        assert_eq!(tip_amount(zero, TipTier::Twenty, true), Some(Decimal::ZERO));
    }

    #[test]
    fn test_out_of_range_cost_is_no_value() {
        assert!(calculator().compute("99999999999999999999999999999999", TipTier::Twenty, false).is_no_value());
    }

    #[test]
    fn test_largest_bills_keep_two_fraction_digits() {
        let result = calculator().compute("1e28", TipTier::Twenty, false);
        assert_eq!(result.display_text(), format!("Tip Amount: $2{}.00", ",000".repeat(9)));

        let result = calculator().compute("9999999999999999999999999999", TipTier::Twenty, false);
        assert!(result.display_text().ends_with(",999.80"), "{}", result.display_text());

        let result = calculator().compute("79228162514264337593543950335", TipTier::Fifteen, true);
        let (_, fraction) = result.display_text().rsplit_once('.').unwrap();
        assert_eq!(fraction, "00");
    }

    #[test]
    fn test_bill_parsing() {
        assert_eq!(BillAmount::parse(" 42.5 ").map(BillAmount::value), Some(dec("42.5")));
        assert_eq!(BillAmount::parse("5e1").map(BillAmount::value), Some(dec("50")));
        assert_eq!(BillAmount::parse("-0").map(BillAmount::value), Some(Decimal::ZERO));
        assert_eq!("".parse::<BillAmount>(), Err(ParseBillError::Empty));
        assert_eq!("-3".parse::<BillAmount>(), Err(ParseBillError::Negative(dec("-3"))));
        assert!(matches!("abc".parse::<BillAmount>(), Err(ParseBillError::Malformed(_))));
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("20%".parse::<TipTier>(), Ok(TipTier::Twenty));
        assert_eq!("Good".parse::<TipTier>(), Ok(TipTier::Eighteen));
        assert_eq!(" fifteen ".parse::<TipTier>(), Ok(TipTier::Fifteen));
        assert!("25".parse::<TipTier>().is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_fifteen() {
        assert_eq!(TipTier::resolve(None), TipTier::Fifteen);
        assert_eq!(TipTier::resolve(Some("bogus")), TipTier::Fifteen);
        assert_eq!(TipTier::resolve(Some("18")), TipTier::Eighteen);
    }

    #[test]
    fn test_tier_cycling() {
        assert_eq!(TipTier::Twenty.next(), TipTier::Eighteen);
        assert_eq!(TipTier::Fifteen.next(), TipTier::Twenty);
        assert_eq!(TipTier::Twenty.previous(), TipTier::Fifteen);
    }

    #[test]
    fn test_custom_template() {
        let calc = calculator().with_template("Gorjeta: {amount}!");
        assert_eq!(calc.compute("10", TipTier::Twenty, false).display_text(), "Gorjeta: $2.00!");
    }

    #[test]
    fn test_json_shape() {
        let amount = serde_json::to_value(calculator().compute("50", TipTier::Twenty, false)).unwrap();
        assert_eq!(amount["result"], "amount");
        assert_eq!(amount["formatted"], "$10.00");

        let none = serde_json::to_value(TipResult::NoValue).unwrap();
        assert_eq!(none, serde_json::json!({ "result": "no_value" }));
    }
}
