//! Units to sell before fixed costs are recovered.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{self, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    pub profitable: bool,
    /// Whole units; `f64::INFINITY` when every sale loses money.
    pub break_even_quantity: f64,
    pub margin_per_unit: f64,
    pub fixed_costs: f64,
    pub cost_per_unit: f64,
    pub price_per_unit: f64,
    pub message: Option<String>,
}

impl BreakEven {
    /// Profit (negative for a loss) after selling `quantity` units.
    pub fn profit_at(&self, quantity: u64) -> f64 {
        quantity as f64 * self.margin_per_unit - self.fixed_costs
    }
}

/// Boundary check for user-entered amounts. [`analyze`] itself accepts
/// anything.
pub fn validate(fixed_costs: f64, cost_per_unit: f64, price_per_unit: f64) -> Result<()> {
    error::non_negative("fixed_costs", fixed_costs)?;
    error::non_negative("cost_per_unit", cost_per_unit)?;
    error::non_negative("price_per_unit", price_per_unit)
}

/// Relate fixed costs and per-unit margin to a break-even quantity.
///
/// An unprofitable price is a normal result, not an error.
///
/// ```
/// let result = print_cost::break_even::analyze(500.0, 2.0, 7.0);
/// assert!(result.profitable);
/// assert_eq!(result.break_even_quantity, 100.0);
/// ```
pub fn analyze(fixed_costs: f64, cost_per_unit: f64, price_per_unit: f64) -> BreakEven {
    let margin_per_unit = price_per_unit - cost_per_unit;
    if margin_per_unit <= 0.0 {
        return BreakEven {
            profitable: false,
            break_even_quantity: f64::INFINITY,
            margin_per_unit,
            fixed_costs,
            cost_per_unit,
            price_per_unit,
            message: Some("selling price must exceed cost per unit".to_string()),
        };
    }

    let break_even_quantity = (fixed_costs / margin_per_unit).ceil();
    info!(fixed_costs, margin_per_unit, break_even_quantity, "Break-even analysis");
    BreakEven {
        profitable: true,
        break_even_quantity,
        margin_per_unit,
        fixed_costs,
        cost_per_unit,
        price_per_unit,
        message: None,
    }
}

impl fmt::Display for BreakEven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Break-Even ===")?;
        writeln!(f, "Fixed costs:     {:.2}", self.fixed_costs)?;
        writeln!(f, "Cost per unit:   {:.2}", self.cost_per_unit)?;
        writeln!(f, "Price per unit:  {:.2}", self.price_per_unit)?;
        writeln!(f, "Margin per unit: {:.2}", self.margin_per_unit)?;
        match &self.message {
            Some(message) if !self.profitable => writeln!(f, "Not profitable: {message}"),
            _ => writeln!(f, "Break-even at {:.0} units", self.break_even_quantity),
        }
    }
}
