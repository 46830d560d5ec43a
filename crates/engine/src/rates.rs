//! Static exchange-rate tables.
//!
//! Rates are indicative, not live: the tables below anchor on INR and USD
//! and every other base is derived by cross-rating through INR.

use crate::currency::Currency;

/// One INR buys this much of each currency.
const INR_RATES: [(Currency, f64); 9] = [
    (Currency::Usd, 0.012),
    (Currency::Eur, 0.011),
    (Currency::Gbp, 0.0096),
    (Currency::Aed, 0.044),
    (Currency::Sgd, 0.016),
    (Currency::Cad, 0.016),
    (Currency::Aud, 0.018),
    (Currency::Jpy, 1.75),
    (Currency::Cny, 0.086),
];

/// One USD buys this much of each currency.
const USD_RATES: [(Currency, f64); 9] = [
    (Currency::Inr, 83.12),
    (Currency::Eur, 0.92),
    (Currency::Gbp, 0.79),
    (Currency::Aed, 3.67),
    (Currency::Sgd, 1.33),
    (Currency::Cad, 1.36),
    (Currency::Aud, 1.52),
    (Currency::Jpy, 147.66),
    (Currency::Cny, 7.16),
];

fn table_rate(table: &[(Currency, f64)], target: Currency) -> Option<f64> {
    table
        .iter()
        .find(|(currency, _)| *currency == target)
        .map(|(_, rate)| *rate)
}

/// Multiplier turning one major unit of `from` into major units of `to`.
pub fn rate(from: Currency, to: Currency) -> f64 {
    if from == to {
        return 1.0;
    }
    match from {
        Currency::Inr => table_rate(&INR_RATES, to).unwrap_or(1.0),
        Currency::Usd => table_rate(&USD_RATES, to).unwrap_or(1.0),
        base => {
            // Cross through INR: base -> INR, then INR -> target.
            let base_to_inr = 1.0 / table_rate(&INR_RATES, base).unwrap_or(1.0);
            if to == Currency::Inr {
                base_to_inr
            } else {
                base_to_inr * table_rate(&INR_RATES, to).unwrap_or(1.0)
            }
        }
    }
}

/// Full rate table for `base`, one entry per other supported currency.
pub fn rates_for(base: Currency) -> Vec<(Currency, f64)> {
    Currency::ALL
        .iter()
        .filter(|currency| **currency != base)
        .map(|currency| (*currency, rate(base, *currency)))
        .collect()
}

/// Convert an amount in minor units, returning the converted amount and
/// the major-unit rate that was applied.
pub fn convert_minor(amount_minor: i64, from: Currency, to: Currency) -> (i64, f64) {
    let applied = rate(from, to);
    let major = amount_minor as f64 / from.minor_per_major() as f64;
    let converted = (major * applied * to.minor_per_major() as f64).round() as i64;
    (converted, applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rate_is_one() {
        assert_eq!(rate(Currency::Inr, Currency::Inr), 1.0);
        assert_eq!(convert_minor(12_345, Currency::Usd, Currency::Usd).0, 12_345);
    }

    #[test]
    fn inr_to_usd_uses_anchor_table() {
        let (minor, applied) = convert_minor(100_000, Currency::Inr, Currency::Usd);
        assert_eq!(applied, 0.012);
        assert_eq!(minor, 1_200);
    }

    #[test]
    fn derived_base_crosses_through_inr() {
        // 1 EUR = 1/0.011 INR ≈ 90.91 INR
        let eur_inr = rate(Currency::Eur, Currency::Inr);
        assert!((eur_inr - 90.909).abs() < 0.01);
        // EUR -> GBP must agree with EUR -> INR -> GBP.
        let eur_gbp = rate(Currency::Eur, Currency::Gbp);
        assert!((eur_gbp - eur_inr * 0.0096).abs() < 1e-9);
    }

    #[test]
    fn jpy_conversion_respects_minor_units() {
        // 1000 INR = 1750 JPY, and JPY minor units are whole yen.
        let (minor, _) = convert_minor(100_000, Currency::Inr, Currency::Jpy);
        assert_eq!(minor, 1_750);
    }

    #[test]
    fn rate_table_excludes_base() {
        let table = rates_for(Currency::Usd);
        assert_eq!(table.len(), Currency::ALL.len() - 1);
        assert!(table.iter().all(|(currency, _)| *currency != Currency::Usd));
    }
}
