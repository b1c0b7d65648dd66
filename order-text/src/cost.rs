//! Print-cost estimate: material plus machine time, plus a profit margin.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{OrderTextError, Result};

pub const DEFAULT_COST_PER_GRAM: f64 = 0.05;
pub const DEFAULT_PROFIT_MARGIN_PERCENT: f64 = 40.0;
pub const DEFAULT_COST_PER_HOUR: f64 = 0.5;

/// Pricing inputs. Loaded from env by [`CostOptions::from_env`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOptions {
    /// COST_PER_GRAM
    pub cost_per_gram: f64,
    /// PROFIT_MARGIN_PERCENT
    pub margin_percent: f64,
    /// COST_PER_HOUR
    pub cost_per_hour: f64,
    /// Printer time for this piece; 0 ignores machine cost.
    pub print_hours: f64,
}

impl Default for CostOptions {
    fn default() -> Self {
        Self {
            cost_per_gram: DEFAULT_COST_PER_GRAM,
            margin_percent: DEFAULT_PROFIT_MARGIN_PERCENT,
            cost_per_hour: DEFAULT_COST_PER_HOUR,
            print_hours: 0.0,
        }
    }
}

fn env_f64(key: &str, default: f64) -> anyhow::Result<f64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{} is not a number: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl CostOptions {
    pub fn from_env() -> anyhow::Result<Self> {
        let options = Self {
            cost_per_gram: env_f64("COST_PER_GRAM", DEFAULT_COST_PER_GRAM)?,
            margin_percent: env_f64("PROFIT_MARGIN_PERCENT", DEFAULT_PROFIT_MARGIN_PERCENT)?,
            cost_per_hour: env_f64("COST_PER_HOUR", DEFAULT_COST_PER_HOUR)?,
            print_hours: 0.0,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_print_hours(mut self, hours: f64) -> Self {
        self.print_hours = hours;
        self
    }

    /// Rates and hours must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cost_per_gram", self.cost_per_gram),
            ("margin_percent", self.margin_percent),
            ("cost_per_hour", self.cost_per_hour),
            ("print_hours", self.print_hours),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OrderTextError::InvalidOption(format!("{} = {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Breakdown of a price, every amount rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub grams: f64,
    pub material_cost: f64,
    pub machine_cost: f64,
    pub base_cost: f64,
    pub margin_percent: f64,
    pub margin: f64,
    pub final_price: f64,
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn estimate_cost(grams: f64, options: &CostOptions) -> Result<CostEstimate> {
    if !grams.is_finite() || grams <= 0.0 {
        return Err(OrderTextError::InvalidGrams(grams));
    }
    options.validate()?;

    let material = grams * options.cost_per_gram;
    let machine = options.print_hours * options.cost_per_hour;
    let base = material + machine;
    let margin = base * (options.margin_percent / 100.0);

    Ok(CostEstimate {
        grams,
        material_cost: cents(material),
        machine_cost: cents(machine),
        base_cost: cents(base),
        margin_percent: options.margin_percent,
        margin: cents(margin),
        final_price: cents(base + margin),
    })
}

/// One-line summary, e.g. `📊 Cálculo: 120g → $8.40`.
pub fn format_estimate(estimate: &CostEstimate, currency: &str) -> String {
    format!(
        "📊 Cálculo: {}g → {}{:.2}",
        estimate.grams, currency, estimate.final_price
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_estimate_defaults() {
        let e = estimate_cost(120.0, &CostOptions::default()).unwrap();
        assert_eq!(e.material_cost, 6.0);
        assert_eq!(e.machine_cost, 0.0);
        assert_eq!(e.margin, 2.4);
        assert_eq!(e.final_price, 8.4);
        assert_eq!(format_estimate(&e, "$"), "📊 Cálculo: 120g → $8.40");
    }

    #[test]
    fn test_estimate_with_machine_time() {
        let options = CostOptions::default().with_print_hours(3.0);
        let e = estimate_cost(33.0, &options).unwrap();
        assert_eq!(e.material_cost, 1.65);
        assert_eq!(e.machine_cost, 1.5);
        assert_eq!(e.base_cost, 3.15);
        assert_eq!(e.final_price, 4.41);
    }

    #[test]
    fn test_non_positive_grams_is_error() {
        assert_eq!(
            estimate_cost(0.0, &CostOptions::default()),
            Err(OrderTextError::InvalidGrams(0.0))
        );
        assert!(estimate_cost(-5.0, &CostOptions::default()).is_err());
        assert!(estimate_cost(f64::NAN, &CostOptions::default()).is_err());
    }

    #[test]
    fn test_negative_rate_is_error() {
        let options = CostOptions {
            cost_per_gram: -1.0,
            ..CostOptions::default()
        };
        assert!(matches!(
            estimate_cost(10.0, &options),
            Err(OrderTextError::InvalidOption(_))
        ));
    }

    #[test]
    #[serial]
    fn test_options_from_env() {
        env::set_var("COST_PER_GRAM", "0.08");
        env::set_var("PROFIT_MARGIN_PERCENT", "25");
        env::remove_var("COST_PER_HOUR");

        let options = CostOptions::from_env().unwrap();
        assert_eq!(options.cost_per_gram, 0.08);
        assert_eq!(options.margin_percent, 25.0);
        assert_eq!(options.cost_per_hour, DEFAULT_COST_PER_HOUR);

        env::set_var("COST_PER_GRAM", "caro");
        assert!(CostOptions::from_env().is_err());

        env::remove_var("COST_PER_GRAM");
        env::remove_var("PROFIT_MARGIN_PERCENT");
    }
}
