use std::fmt;

use crate::error::EngineError;

/// Currencies the engine can record and convert between.
///
/// Amounts are always stored in minor units (paise, cents, ...) of the
/// transaction currency, alongside an INR-normalised copy used by budgets
/// and analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
    Aed,
    Sgd,
    Cad,
    Aud,
    Jpy,
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Inr,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Aed,
        Currency::Sgd,
        Currency::Cad,
        Currency::Aud,
        Currency::Jpy,
        Currency::Cny,
    ];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aed => "AED",
            Currency::Sgd => "SGD",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Aed => "د.إ",
            Currency::Sgd => "S$",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Jpy => "¥",
            Currency::Cny => "¥",
        }
    }

    /// Minor units per major unit. JPY has no subdivision.
    pub fn minor_per_major(&self) -> i64 {
        match self {
            Currency::Jpy => 1,
            _ => 100,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "AED" => Ok(Currency::Aed),
            "SGD" => Ok(Currency::Sgd),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "JPY" => Ok(Currency::Jpy),
            "CNY" => Ok(Currency::Cny),
            other => Err(EngineError::UnknownCurrency(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(Currency::try_from("inr").unwrap(), Currency::Inr);
        assert_eq!(Currency::try_from(" USD ").unwrap(), Currency::Usd);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(matches!(
            Currency::try_from("BTC"),
            Err(EngineError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn jpy_has_no_minor_unit() {
        assert_eq!(Currency::Jpy.minor_per_major(), 1);
        assert_eq!(Currency::Inr.minor_per_major(), 100);
    }
}
