//! Presentation-time money formatting. Amounts are never rounded before this point.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("ARS")
    }
}

/// Locale-aware number separators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl LocaleConfig {
    /// Separators for a BCP 47 tag. Unknown tags fall back to `en-US` separators.
    pub fn for_tag(tag: &str) -> Self {
        let (decimal_separator, grouping_separator) = match tag {
            "es-AR" | "es-ES" | "es-CL" | "es-CO" | "es-UY" | "de-DE" | "it-IT" | "pt-BR"
            | "nl-NL" => (',', '.'),
            "fr-FR" => (',', ' '),
            _ => ('.', ','),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_tag("es-AR")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NegativeStyle {
    #[default]
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CurrencyDisplay {
    #[default]
    Symbol,
    Code,
}

/// Formats amounts for one currency and locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyFormatter {
    pub code: CurrencyCode,
    pub locale: LocaleConfig,
    pub display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
}

impl CurrencyFormatter {
    pub fn new(code: CurrencyCode, locale: LocaleConfig) -> Self {
        Self {
            code,
            locale,
            display: CurrencyDisplay::default(),
            negative_style: NegativeStyle::default(),
        }
    }

    pub fn format(&self, amount: f64) -> String {
        let precision = minor_units_for(self.code.as_str());
        let body = format_number(&self.locale, amount.abs(), precision);
        let prefixed = match self.display {
            CurrencyDisplay::Symbol => format!("{}{}", symbol_for(self.code.as_str()), body),
            CurrencyDisplay::Code => format!("{} {}", self.code.as_str(), body),
        };
        if amount < 0.0 {
            match self.negative_style {
                NegativeStyle::Sign => format!("-{}", prefixed),
                NegativeStyle::Parentheses => format!("({})", prefixed),
            }
        } else {
            prefixed
        }
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" | "ARS" | "MXN" | "CLP" | "COP" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "BRL" => "R$".into(),
        "AUD" => "A$".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" | "CLP" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let raw = format!("{:.*}", precision as usize, value);
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (raw.as_str(), None),
    };
    let grouped = match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, locale.grouping_separator)),
        None => group_digits(int_part, locale.grouping_separator),
    };
    match frac_part {
        Some(frac) => format!("{}{}{}", grouped, locale.decimal_separator, frac),
        None => grouped,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_formatter_uses_argentine_conventions() {
        let formatter = CurrencyFormatter::default();
        assert_eq!(formatter.format(1234567.5), "$1.234.567,50");
        assert_eq!(formatter.format(-20.0), "-$20,00");
    }

    #[test]
    fn us_locale_with_code_display() {
        let mut formatter =
            CurrencyFormatter::new(CurrencyCode::new("usd"), LocaleConfig::for_tag("en-US"));
        formatter.display = CurrencyDisplay::Code;
        formatter.negative_style = NegativeStyle::Parentheses;
        assert_eq!(formatter.format(1000.0), "USD 1,000.00");
        assert_eq!(formatter.format(-5.25), "(USD 5.25)");
    }

    #[test]
    fn zero_precision_currencies_drop_decimals() {
        let formatter =
            CurrencyFormatter::new(CurrencyCode::new("JPY"), LocaleConfig::for_tag("en-US"));
        assert_eq!(formatter.format(1500.4), "¥1,500");
    }
}
