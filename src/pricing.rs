use crate::fmt::money;
use crate::models::SubscriptionSelection;

/// Tunable pricing inputs, normally taken from `Settings::pricing()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    pub price_per_gb_month: f64,
    /// Multiplier applied to the total when paying upfront (0.9 = 10% off).
    pub upfront_discount_factor: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_per_gb_month: 2.0,
            upfront_discount_factor: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSummary {
    pub total_price: f64,
    pub discounted_price: f64,
    pub savings: f64,
    pub upfront_payment: bool,
}

impl OrderSummary {
    pub fn compute(selection: &SubscriptionSelection, pricing: &PricingConfig) -> Self {
        let total_price = f64::from(selection.size_gb.gigabytes())
            * f64::from(selection.duration_months.months())
            * pricing.price_per_gb_month;
        let factor = if selection.upfront_payment {
            pricing.upfront_discount_factor
        } else {
            1.0
        };
        let discounted_price = total_price * factor;
        Self {
            total_price,
            discounted_price,
            savings: total_price - discounted_price,
            upfront_payment: selection.upfront_payment,
        }
    }

    /// Display lines. The original total and savings only appear for upfront payment.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Price: {}", money(self.discounted_price))];
        if self.upfront_payment {
            lines.push(format!("Original price: {}", money(self.total_price)));
            lines.push(format!("You save: {}", money(self.savings)));
        }
        lines
    }
}
