//! Finance bands keyed by credit rating

use serde::{Deserialize, Serialize};

/// Money rule: `fixed + per_point * credit_rating`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MoneyRule {
    #[serde(default)]
    pub fixed: f64,
    #[serde(default)]
    pub per_point: f64,
}

impl MoneyRule {
    #[inline]
    pub fn amount(&self, credit_rating: i32) -> f64 {
        self.fixed + self.per_point * credit_rating as f64
    }
}

/// Finance band for an inclusive credit rating range
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceBand {
    pub min: i32,
    pub max: i32,
    pub spending_level: f64,
    #[serde(default)]
    pub cash: MoneyRule,
    #[serde(default)]
    pub assets: MoneyRule,
}

/// Resolved finances for a credit rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Finances {
    pub credit_rating: i32,
    pub spending_level: f64,
    pub cash: f64,
    pub assets: f64,
}

/// Find the band covering `credit_rating` and resolve it
pub fn finance_for_credit(bands: &[FinanceBand], credit_rating: i32) -> Option<Finances> {
    bands
        .iter()
        .find(|band| credit_rating >= band.min && credit_rating <= band.max)
        .map(|band| Finances {
            credit_rating,
            spending_level: band.spending_level,
            cash: band.cash.amount(credit_rating),
            assets: band.assets.amount(credit_rating),
        })
}

/// Format a dollar amount the way the sheet shows it ("$0.50", "$40", "$5,000,000")
pub fn format_money(amount: f64) -> String {
    if amount.fract().abs() > f64::EPSILON {
        return format!("${:.2}", amount);
    }
    let digits = format!("{}", amount as i64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> Vec<FinanceBand> {
        vec![
            FinanceBand {
                min: 0,
                max: 0,
                spending_level: 0.5,
                cash: MoneyRule { fixed: 0.5, per_point: 0.0 },
                assets: MoneyRule::default(),
            },
            FinanceBand {
                min: 10,
                max: 49,
                spending_level: 10.0,
                cash: MoneyRule { fixed: 0.0, per_point: 2.0 },
                assets: MoneyRule { fixed: 0.0, per_point: 50.0 },
            },
        ]
    }

    #[test]
    fn test_finance_for_credit_band() {
        let finances = finance_for_credit(&bands(), 20).unwrap();
        assert_eq!(finances.spending_level, 10.0);
        assert_eq!(finances.cash, 40.0);
        assert_eq!(finances.assets, 1000.0);
    }

    #[test]
    fn test_finance_for_credit_outside_bands() {
        assert!(finance_for_credit(&bands(), 5).is_none());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.5), "$0.50");
        assert_eq!(format_money(40.0), "$40");
        assert_eq!(format_money(5_000_000.0), "$5,000,000");
        assert_eq!(format_money(100.0), "$100");
    }
}
