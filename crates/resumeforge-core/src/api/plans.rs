//! Pricing plans and product identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::UnknownField;

/// Product identifier understood by the checkout endpoint
///
/// Passed through as-is; the server decides whether it is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductSku(String);

impl ProductSku {
    pub fn new(sku: impl Into<String>) -> Self {
        Self(sku.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plan shown on the pricing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plan {
    Free,
    Starter,
    Pro,
    Unlimited,
}

impl Plan {
    pub const ALL: &'static [Plan] = &[Plan::Free, Plan::Starter, Plan::Pro, Plan::Unlimited];

    pub fn id(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Unlimited => "unlimited",
        }
    }

    /// SKU to purchase; `None` for the free plan
    pub fn sku(&self) -> Option<ProductSku> {
        let sku = match self {
            Plan::Free => return None,
            Plan::Starter => "starter_30",
            Plan::Pro => "pro_100",
            Plan::Unlimited => "unlimited_monthly",
        };
        Some(ProductSku::new(sku))
    }

    pub fn price_cents(&self) -> u32 {
        match self {
            Plan::Free => 0,
            Plan::Starter => 299,
            Plan::Pro => 699,
            Plan::Unlimited => 999,
        }
    }

    pub fn is_popular(&self) -> bool {
        matches!(self, Plan::Pro)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Plan {
    type Err = UnknownField;

    /// Accepts a plan id (`pro`) or its SKU (`pro_100`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|plan| {
                plan.id().eq_ignore_ascii_case(s)
                    || plan.sku().is_some_and(|sku| sku.as_str().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| UnknownField {
                kind: "plan",
                key: s.to_string(),
                valid: "free, starter, pro, unlimited".to_string(),
            })
    }
}

/// Format cents as dollars, e.g. `6.99`
pub fn format_price(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents.rem_euclid(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_catalog() {
        let skus: Vec<_> = Plan::ALL.iter().map(|p| p.sku()).collect();
        assert_eq!(
            skus,
            vec![
                None,
                Some(ProductSku::new("starter_30")),
                Some(ProductSku::new("pro_100")),
                Some(ProductSku::new("unlimited_monthly")),
            ]
        );

        let prices: Vec<_> = Plan::ALL.iter().map(|p| p.price_cents()).collect();
        assert_eq!(prices, vec![0, 299, 699, 999]);
    }

    #[test]
    fn test_parse_by_id_or_sku() {
        assert_eq!("pro".parse::<Plan>().unwrap(), Plan::Pro);
        assert_eq!("Starter".parse::<Plan>().unwrap(), Plan::Starter);
        assert_eq!("unlimited_monthly".parse::<Plan>().unwrap(), Plan::Unlimited);
        assert!("enterprise".parse::<Plan>().is_err());
    }

    #[test]
    fn test_only_pro_is_popular() {
        let popular: Vec<_> = Plan::ALL.iter().filter(|p| p.is_popular()).collect();
        assert_eq!(popular, vec![&Plan::Pro]);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "0.00");
        assert_eq!(format_price(299), "2.99");
        assert_eq!(format_price(999), "9.99");
        assert_eq!(format_price(1000), "10.00");
    }
}
