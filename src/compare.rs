//! Side-by-side pricing of alternative print setups.

use std::fmt;

use tracing::info;

use crate::calculator::{CalculationRequest, CostBreakdown, CostEngine};

/// A named set of calculation inputs.
#[derive(Debug, Clone)]
pub struct Scenario<'a> {
    pub name: String,
    pub request: CalculationRequest<'a>,
}

impl<'a> Scenario<'a> {
    pub fn new(name: impl Into<String>, request: CalculationRequest<'a>) -> Self {
        Self {
            name: name.into(),
            request,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub breakdown: CostBreakdown,
    pub is_lowest: bool,
    pub is_highest: bool,
    pub difference_from_lowest: f64,
    /// Difference relative to the cheapest total, or 0 if that total is 0.
    pub percent_from_lowest: f64,
}

impl ScenarioResult {
    pub fn total(&self) -> f64 {
        self.breakdown.total
    }
}

/// Results in the order the scenarios were given. Ties on the lowest or
/// highest total are all flagged.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub results: Vec<ScenarioResult>,
}

impl Comparison {
    pub fn lowest(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| r.is_lowest)
    }

    pub fn highest(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| r.is_highest)
    }
}

impl CostEngine {
    /// Price every scenario and rank the totals.
    pub fn compare(&self, scenarios: &[Scenario<'_>]) -> Comparison {
        let priced: Vec<(String, CostBreakdown)> = scenarios
            .iter()
            .map(|s| (s.name.clone(), self.calculate(&s.request)))
            .collect();

        let min_total = priced
            .iter()
            .map(|(_, b)| b.total)
            .fold(f64::INFINITY, f64::min);
        let max_total = priced
            .iter()
            .map(|(_, b)| b.total)
            .fold(f64::NEG_INFINITY, f64::max);

        let results: Vec<ScenarioResult> = priced
            .into_iter()
            .map(|(name, breakdown)| {
                let difference = breakdown.total - min_total;
                ScenarioResult {
                    is_lowest: breakdown.total == min_total,
                    is_highest: breakdown.total == max_total,
                    difference_from_lowest: difference,
                    percent_from_lowest: if min_total > 0.0 {
                        difference / min_total * 100.0
                    } else {
                        0.0
                    },
                    name,
                    breakdown,
                }
            })
            .collect();

        if !results.is_empty() {
            info!(
                scenarios = results.len(),
                min_total, max_total, "Compared print scenarios"
            );
        }

        Comparison { results }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Scenario Comparison ===")?;
        writeln!(f, "{:<24} {:>12} {:>12} {:>9}", "Scenario", "Total", "+Lowest", "+%")?;
        writeln!(f, "{}", "-".repeat(60))?;
        for r in &self.results {
            let marker = match (r.is_lowest, r.is_highest) {
                (true, true) => " (lowest, highest)",
                (true, false) => " (lowest)",
                (false, true) => " (highest)",
                (false, false) => "",
            };
            writeln!(
                f,
                "{:<24} {:>12.4} {:>12.4} {:>8.1}%{}",
                r.name,
                r.total(),
                r.difference_from_lowest,
                r.percent_from_lowest,
                marker
            )?;
        }
        Ok(())
    }
}
