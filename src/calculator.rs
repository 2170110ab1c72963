//! Cost engine: turns usage numbers into an itemized, risk-buffered price.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CostConfig;
use crate::depreciation::{Depreciating, MINUTES_PER_HOUR};
use crate::error::{self, Result};
use crate::models::{
    Consumable, ConsumableKind, Filament, FilamentRecord, Printer, PrinterRecord,
};

/// Everything needed to price one print.
///
/// Rates left as `None` fall back to the engine's [`CostConfig`].
#[derive(Debug, Clone, Copy)]
pub struct CalculationRequest<'a> {
    pub printer: &'a Printer,
    pub filament: &'a Filament,
    pub consumables: &'a [Consumable],
    pub print_time_minutes: f64,
    pub filament_grams: f64,
    pub electricity_rate: Option<f64>,
    pub failure_rate: Option<f64>,
    pub labor_hourly_rate: f64,
    pub labor_hours: f64,
    pub markup_percent: f64,
}

impl<'a> CalculationRequest<'a> {
    pub fn new(
        printer: &'a Printer,
        filament: &'a Filament,
        print_time_minutes: f64,
        filament_grams: f64,
    ) -> Self {
        Self {
            printer,
            filament,
            consumables: &[],
            print_time_minutes,
            filament_grams,
            electricity_rate: None,
            failure_rate: None,
            labor_hourly_rate: 0.0,
            labor_hours: 0.0,
            markup_percent: 0.0,
        }
    }

    #[must_use]
    pub fn with_consumables(mut self, consumables: &'a [Consumable]) -> Self {
        self.consumables = consumables;
        self
    }

    #[must_use]
    pub fn with_electricity_rate(mut self, rate: f64) -> Self {
        self.electricity_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn with_labor(mut self, hourly_rate: f64, hours: f64) -> Self {
        self.labor_hourly_rate = hourly_rate;
        self.labor_hours = hours;
        self
    }

    #[must_use]
    pub fn with_markup(mut self, percent: f64) -> Self {
        self.markup_percent = percent;
        self
    }

    /// Boundary check for callers taking user input. The engine never calls
    /// this and prices whatever it is given.
    pub fn validate(&self) -> Result<()> {
        error::non_negative("print_time_minutes", self.print_time_minutes)?;
        error::non_negative("filament_grams", self.filament_grams)?;
        if let Some(rate) = self.electricity_rate {
            error::non_negative("electricity_rate", rate)?;
        }
        if let Some(rate) = self.failure_rate {
            error::unit_fraction("failure_rate", rate)?;
        }
        error::non_negative("labor_hourly_rate", self.labor_hourly_rate)?;
        error::non_negative("labor_hours", self.labor_hours)?;
        error::non_negative("markup_percent", self.markup_percent)
    }
}

/// Flattened inputs for a what-if estimate without stored entities.
///
/// Unset values come from the engine's [`CostConfig`]. There is no
/// consumable wear in a quick estimate.
#[derive(Debug, Clone, Default)]
pub struct QuickEstimate {
    pub print_time_minutes: f64,
    pub filament_grams: f64,
    pub price_per_gram: Option<f64>,
    pub printer_watts: Option<f64>,
    pub printer_price: Option<f64>,
    pub printer_lifetime_hours: Option<f64>,
    pub electricity_rate: Option<f64>,
    pub failure_rate: Option<f64>,
    pub labor_hourly_rate: f64,
    pub labor_hours: f64,
    pub markup_percent: f64,
}

impl QuickEstimate {
    pub fn validate(&self) -> Result<()> {
        error::non_negative("print_time_minutes", self.print_time_minutes)?;
        error::non_negative("filament_grams", self.filament_grams)?;
        for (field, value) in [
            ("price_per_gram", self.price_per_gram),
            ("printer_watts", self.printer_watts),
            ("printer_price", self.printer_price),
            ("printer_lifetime_hours", self.printer_lifetime_hours),
            ("electricity_rate", self.electricity_rate),
        ] {
            if let Some(value) = value {
                error::non_negative(field, value)?;
            }
        }
        if let Some(rate) = self.failure_rate {
            error::unit_fraction("failure_rate", rate)?;
        }
        error::non_negative("labor_hourly_rate", self.labor_hourly_rate)?;
        error::non_negative("labor_hours", self.labor_hours)?;
        error::non_negative("markup_percent", self.markup_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentLine {
    pub grams: f64,
    pub price_per_gram: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityLine {
    pub power_watts: f64,
    pub kwh: f64,
    pub rate: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationLine {
    pub printer_per_hour: f64,
    /// Zero when no auxiliary module is attached.
    pub auxiliary_per_hour: f64,
    pub cost: f64,
}

/// One wear part's share of a print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableLine {
    pub id: String,
    pub name: String,
    pub kind: ConsumableKind,
    pub cost_per_hour: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborLine {
    pub hourly_rate: f64,
    pub hours: f64,
    pub cost: f64,
}

/// Share of the subtotal (not the total) taken by each component, 0..=100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostPercentages {
    pub filament: f64,
    pub electricity: f64,
    pub depreciation: f64,
    pub consumables: f64,
    pub labor: f64,
}

impl CostPercentages {
    pub fn sum(&self) -> f64 {
        self.filament + self.electricity + self.depreciation + self.consumables + self.labor
    }
}

/// The resolved inputs a breakdown was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageParameters {
    pub printer_id: String,
    pub filament_id: String,
    pub consumable_ids: Vec<String>,
    pub print_time_minutes: f64,
    pub filament_grams: f64,
    pub electricity_rate: f64,
    pub failure_rate: f64,
    pub labor_hourly_rate: f64,
    pub labor_hours: f64,
    pub markup_percent: f64,
}

/// Itemized cost of one print.
///
/// `total = subtotal + failure_buffer + markup_amount`, where the buffer
/// spreads expected failed attempts over the successful one and the markup
/// applies to the buffered cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub filament: FilamentLine,
    pub electricity: ElectricityLine,
    pub depreciation: DepreciationLine,
    pub consumables: Vec<ConsumableLine>,
    pub consumables_cost: f64,
    pub labor: LaborLine,
    pub subtotal: f64,
    pub failure_rate: f64,
    pub effective_cost: f64,
    pub failure_buffer: f64,
    pub markup_percent: f64,
    pub markup_amount: f64,
    pub total: f64,
    pub percentages: CostPercentages,
    pub parameters: UsageParameters,
}

/// Component costs before risk and profit.
struct ComponentCosts {
    filament: f64,
    electricity: f64,
    depreciation: f64,
    consumables: f64,
    labor: f64,
}

impl ComponentCosts {
    fn subtotal(&self) -> f64 {
        self.filament + self.electricity + self.depreciation + self.consumables + self.labor
    }

    fn percentages(&self, subtotal: f64) -> CostPercentages {
        if subtotal <= 0.0 {
            return CostPercentages::default();
        }
        let share = |cost: f64| cost / subtotal * 100.0;
        CostPercentages {
            filament: share(self.filament),
            electricity: share(self.electricity),
            depreciation: share(self.depreciation),
            consumables: share(self.consumables),
            labor: share(self.labor),
        }
    }
}

struct Pricing {
    subtotal: f64,
    effective_cost: f64,
    failure_buffer: f64,
    markup_amount: f64,
    total: f64,
}

/// Apply the failure buffer, then markup, to the summed components.
fn price(components: &ComponentCosts, failure_rate: f64, markup_percent: f64) -> Pricing {
    let subtotal = components.subtotal();
    // A certain failure has no finite buffer; price the bare subtotal.
    let effective_cost = if failure_rate >= 1.0 {
        warn!(failure_rate, "Failure rate of 100% or more, skipping failure buffer");
        subtotal
    } else {
        subtotal / (1.0 - failure_rate)
    };
    let failure_buffer = effective_cost - subtotal;
    let markup_amount = effective_cost * markup_percent / 100.0;
    Pricing {
        subtotal,
        effective_cost,
        failure_buffer,
        markup_amount,
        total: effective_cost + markup_amount,
    }
}

/// Prices prints against a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct CostEngine {
    config: CostConfig,
}

impl CostEngine {
    pub fn new(config: CostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Compute the full breakdown for one print.
    ///
    /// Degenerate inputs (zero lifetimes, empty spools, no print time)
    /// price at zero rather than failing. Non-finite inputs are not
    /// checked here; see [`CalculationRequest::validate`].
    pub fn calculate(&self, request: &CalculationRequest<'_>) -> CostBreakdown {
        let minutes = request.print_time_minutes;
        let hours = minutes / MINUTES_PER_HOUR;
        let electricity_rate = request
            .electricity_rate
            .unwrap_or(self.config.electricity_rate);
        let failure_rate = request.failure_rate.unwrap_or(self.config.failure_rate);
        let printer = request.printer;

        let filament = FilamentLine {
            grams: request.filament_grams,
            price_per_gram: request.filament.price_per_gram(),
            cost: request.filament.cost(request.filament_grams),
        };

        let power_watts = printer.total_power_watts();
        let kwh = power_watts * hours / 1000.0;
        let electricity = ElectricityLine {
            power_watts,
            kwh,
            rate: electricity_rate,
            cost: kwh * electricity_rate,
        };

        let depreciation = DepreciationLine {
            printer_per_hour: printer.depreciation_per_hour(),
            auxiliary_per_hour: printer
                .auxiliary
                .as_ref()
                .map_or(0.0, Depreciating::depreciation_per_hour),
            cost: printer.total_depreciation_cost(minutes),
        };

        let consumables: Vec<ConsumableLine> = request
            .consumables
            .iter()
            .map(|c| ConsumableLine {
                id: c.id.clone(),
                name: c.name.clone(),
                kind: c.kind,
                cost_per_hour: c.cost_per_hour(),
                cost: c.cost_per_hour() * hours,
            })
            .collect();
        let consumables_cost: f64 = consumables.iter().map(|line| line.cost).sum();

        let labor = LaborLine {
            hourly_rate: request.labor_hourly_rate,
            hours: request.labor_hours,
            cost: request.labor_hourly_rate * request.labor_hours,
        };

        let components = ComponentCosts {
            filament: filament.cost,
            electricity: electricity.cost,
            depreciation: depreciation.cost,
            consumables: consumables_cost,
            labor: labor.cost,
        };
        let pricing = price(&components, failure_rate, request.markup_percent);

        debug!(
            printer = %printer.id,
            filament = %request.filament.id,
            minutes,
            grams = request.filament_grams,
            subtotal = pricing.subtotal,
            total = pricing.total,
            "Calculated print cost"
        );

        CostBreakdown {
            percentages: components.percentages(pricing.subtotal),
            filament,
            electricity,
            depreciation,
            consumables,
            consumables_cost,
            labor,
            subtotal: pricing.subtotal,
            failure_rate,
            effective_cost: pricing.effective_cost,
            failure_buffer: pricing.failure_buffer,
            markup_percent: request.markup_percent,
            markup_amount: pricing.markup_amount,
            total: pricing.total,
            parameters: UsageParameters {
                printer_id: printer.id.clone(),
                filament_id: request.filament.id.clone(),
                consumable_ids: request.consumables.iter().map(|c| c.id.clone()).collect(),
                print_time_minutes: minutes,
                filament_grams: request.filament_grams,
                electricity_rate,
                failure_rate,
                labor_hourly_rate: request.labor_hourly_rate,
                labor_hours: request.labor_hours,
                markup_percent: request.markup_percent,
            },
        }
    }

    /// Total price of a what-if estimate, using the same stages as
    /// [`CostEngine::calculate`] on a stand-in printer and spool.
    pub fn quick_calculate(&self, estimate: &QuickEstimate) -> f64 {
        let printer = Printer::from_record(
            PrinterRecord {
                id: "quick-estimate".to_string(),
                purchase_price: estimate.printer_price,
                estimated_lifetime_hours: estimate.printer_lifetime_hours,
                printing_watts: estimate.printer_watts,
                ..Default::default()
            },
            &self.config,
        );
        // A one-gram spool priced at the per-gram rate.
        let spool = estimate.price_per_gram.map(|price| FilamentRecord {
            id: "quick-estimate".to_string(),
            spool_weight_g: Some(1.0),
            spool_price: Some(price),
            ..Default::default()
        });
        let filament = Filament::from_record(
            spool.unwrap_or_else(|| FilamentRecord {
                id: "quick-estimate".to_string(),
                ..Default::default()
            }),
            &self.config,
        );

        let mut request = CalculationRequest::new(
            &printer,
            &filament,
            estimate.print_time_minutes,
            estimate.filament_grams,
        )
        .with_labor(estimate.labor_hourly_rate, estimate.labor_hours)
        .with_markup(estimate.markup_percent);
        request.electricity_rate = estimate.electricity_rate;
        request.failure_rate = estimate.failure_rate;

        self.calculate(&request).total
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.percentages;
        writeln!(f, "=== Cost Breakdown ===")?;
        writeln!(
            f,
            "Print: {:.0} min, {:.1} g on {}",
            self.parameters.print_time_minutes, self.filament.grams, self.parameters.printer_id
        )?;
        writeln!(f)?;

        writeln!(f, "  Filament:     {:>10.4} ({:5.1}%)", self.filament.cost, p.filament)?;
        writeln!(
            f,
            "  Electricity:  {:>10.4} ({:5.1}%)  {:.0} W, {:.3} kWh",
            self.electricity.cost, p.electricity, self.electricity.power_watts, self.electricity.kwh
        )?;
        writeln!(f, "  Depreciation: {:>10.4} ({:5.1}%)", self.depreciation.cost, p.depreciation)?;
        writeln!(f, "  Consumables:  {:>10.4} ({:5.1}%)", self.consumables_cost, p.consumables)?;
        for line in &self.consumables {
            writeln!(f, "    {} ({}): {:.4}", line.name, line.kind, line.cost)?;
        }
        writeln!(f, "  Labor:        {:>10.4} ({:5.1}%)", self.labor.cost, p.labor)?;
        writeln!(f)?;

        writeln!(f, "Subtotal:       {:>10.4}", self.subtotal)?;
        writeln!(
            f,
            "Failure buffer: {:>10.4} ({:.1}% failure rate)",
            self.failure_buffer,
            self.failure_rate * 100.0
        )?;
        writeln!(
            f,
            "Markup:         {:>10.4} ({:.1}%)",
            self.markup_amount, self.markup_percent
        )?;
        writeln!(f, "Total:          {:>10.4}", self.total)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuxiliaryModule, ConsumableRecord};
    use approx::assert_relative_eq;

    fn printer() -> Printer {
        Printer {
            id: "mk4".to_string(),
            name: "MK4".to_string(),
            purchase_price: 300.0,
            estimated_lifetime_hours: 5000.0,
            current_hours: 0.0,
            printing_watts: 120.0,
            auxiliary: None,
        }
    }

    fn filament() -> Filament {
        Filament {
            id: "pla".to_string(),
            name: "PLA".to_string(),
            material: "PLA".to_string(),
            color: None,
            diameter_mm: 1.75,
            density: 1.24,
            spool_weight_g: 1000.0,
            spool_price: 25.0,
        }
    }

    fn nozzle(cost_per_hour_divisor: f64) -> Consumable {
        Consumable::from_record(
            ConsumableRecord {
                id: format!("nozzle-{cost_per_hour_divisor}"),
                kind: Some(ConsumableKind::Nozzle),
                unit_price: Some(10.0),
                estimated_lifetime_hours: Some(cost_per_hour_divisor),
                ..Default::default()
            },
            &CostConfig::default(),
        )
    }

    fn engine() -> CostEngine {
        CostEngine::new(CostConfig::default())
    }

    #[test]
    fn reference_print() {
        let (p, f) = (printer(), filament());
        let request = CalculationRequest::new(&p, &f, 60.0, 20.0)
            .with_electricity_rate(0.15)
            .with_failure_rate(0.05);
        let b = engine().calculate(&request);

        assert_relative_eq!(b.filament.cost, 0.5, epsilon = 1e-12);
        assert_relative_eq!(b.electricity.cost, 0.018, epsilon = 1e-12);
        assert_relative_eq!(b.depreciation.cost, 0.06, epsilon = 1e-12);
        assert_eq!(b.consumables_cost, 0.0);
        assert_eq!(b.labor.cost, 0.0);
        assert_relative_eq!(b.subtotal, 0.578, epsilon = 1e-12);
        assert_relative_eq!(b.effective_cost, 0.578 / 0.95, epsilon = 1e-12);
        assert_relative_eq!(b.failure_buffer, 0.030421, epsilon = 1e-6);
        assert_eq!(b.markup_amount, 0.0);
        assert_relative_eq!(b.total, 0.608421, epsilon = 1e-6);
    }

    #[test]
    fn unset_rates_come_from_config() {
        let (p, f) = (printer(), filament());
        let config = CostConfig {
            electricity_rate: 0.40,
            failure_rate: 0.10,
            ..CostConfig::default()
        };
        let b = CostEngine::new(config).calculate(&CalculationRequest::new(&p, &f, 30.0, 5.0));
        assert_eq!(b.parameters.electricity_rate, 0.40);
        assert_eq!(b.failure_rate, 0.10);
        assert_eq!(b.parameters.failure_rate, 0.10);
    }

    #[test]
    fn totals_are_consistent() {
        let p = Printer {
            auxiliary: Some(AuxiliaryModule {
                name: "MMU".to_string(),
                working_watts: 25.0,
                purchase_price: 250.0,
                estimated_lifetime_hours: 3000.0,
                current_hours: 0.0,
            }),
            ..printer()
        };
        let f = filament();
        let parts = [nozzle(500.0), nozzle(1000.0)];
        let request = CalculationRequest::new(&p, &f, 245.0, 87.5)
            .with_consumables(&parts)
            .with_electricity_rate(0.31)
            .with_failure_rate(0.12)
            .with_labor(20.0, 0.25)
            .with_markup(35.0);
        let b = engine().calculate(&request);

        let sum = b.filament.cost
            + b.electricity.cost
            + b.depreciation.cost
            + b.consumables_cost
            + b.labor.cost;
        assert_relative_eq!(b.subtotal, sum, epsilon = 1e-12);
        assert_relative_eq!(
            b.total,
            b.subtotal + b.failure_buffer + b.markup_amount,
            epsilon = 1e-12
        );
        assert_relative_eq!(b.failure_buffer, b.effective_cost - b.subtotal, epsilon = 1e-12);
        assert_relative_eq!(b.markup_amount, b.effective_cost * 0.35, epsilon = 1e-12);
        assert_relative_eq!(b.percentages.sum(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(b.labor.cost, 5.0, epsilon = 1e-12);
        assert_eq!(b.electricity.power_watts, 145.0);
        assert_relative_eq!(b.depreciation.auxiliary_per_hour, 250.0 / 3000.0, epsilon = 1e-12);
    }

    #[test]
    fn consumable_lines_are_itemized() {
        let (p, f) = (printer(), filament());
        let parts = [nozzle(500.0), nozzle(200.0)];
        let b = engine().calculate(&CalculationRequest::new(&p, &f, 120.0, 10.0).with_consumables(&parts));

        assert_eq!(b.consumables.len(), 2);
        assert_relative_eq!(b.consumables[0].cost_per_hour, 0.02, epsilon = 1e-12);
        assert_relative_eq!(b.consumables[0].cost, 0.04, epsilon = 1e-12);
        assert_relative_eq!(b.consumables[1].cost, 0.1, epsilon = 1e-12);
        assert_relative_eq!(b.consumables_cost, 0.14, epsilon = 1e-12);
        assert_eq!(b.parameters.consumable_ids, ["nozzle-500", "nozzle-200"]);
    }

    #[test]
    fn zero_everything_gives_zero_percentages() {
        let p = Printer {
            printing_watts: 0.0,
            estimated_lifetime_hours: 0.0,
            ..printer()
        };
        let f = Filament {
            spool_weight_g: 0.0,
            ..filament()
        };
        let b = engine().calculate(&CalculationRequest::new(&p, &f, 0.0, 0.0));
        assert_eq!(b.subtotal, 0.0);
        assert_eq!(b.total, 0.0);
        assert_eq!(b.percentages, CostPercentages::default());
    }

    #[test]
    fn certain_failure_skips_buffer() {
        let (p, f) = (printer(), filament());
        let b = engine().calculate(&CalculationRequest::new(&p, &f, 60.0, 20.0).with_failure_rate(1.0));
        assert_eq!(b.effective_cost, b.subtotal);
        assert_eq!(b.failure_buffer, 0.0);
    }

    #[test]
    fn markup_applies_after_buffer() {
        let (p, f) = (printer(), filament());
        let request = CalculationRequest::new(&p, &f, 0.0, 100.0)
            .with_failure_rate(0.5)
            .with_markup(10.0);
        let b = engine().calculate(&request);
        // 2.50 of filament, doubled by the buffer, plus 10%.
        assert_relative_eq!(b.effective_cost, 5.0, epsilon = 1e-12);
        assert_relative_eq!(b.markup_amount, 0.5, epsilon = 1e-12);
        assert_relative_eq!(b.total, 5.5, epsilon = 1e-12);
    }

    #[test]
    fn nan_input_propagates() {
        let (p, f) = (printer(), filament());
        let b = engine().calculate(&CalculationRequest::new(&p, &f, f64::NAN, 20.0));
        assert!(b.total.is_nan());
    }

    #[test]
    fn validation_rejects_bad_input() {
        let (p, f) = (printer(), filament());
        assert!(CalculationRequest::new(&p, &f, 60.0, 20.0).validate().is_ok());
        assert!(CalculationRequest::new(&p, &f, -1.0, 20.0).validate().is_err());
        assert!(CalculationRequest::new(&p, &f, 60.0, f64::NAN).validate().is_err());
        assert!(
            CalculationRequest::new(&p, &f, 60.0, 20.0)
                .with_failure_rate(1.0)
                .validate()
                .is_err()
        );
        assert!(
            QuickEstimate {
                printer_watts: Some(-5.0),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn quick_estimate_matches_full_calculation() {
        let engine = engine();
        let estimate = QuickEstimate {
            print_time_minutes: 60.0,
            filament_grams: 20.0,
            price_per_gram: Some(0.025),
            printer_watts: Some(120.0),
            printer_price: Some(300.0),
            printer_lifetime_hours: Some(5000.0),
            electricity_rate: Some(0.15),
            failure_rate: Some(0.05),
            ..Default::default()
        };
        let (p, f) = (printer(), filament());
        let full = engine.calculate(
            &CalculationRequest::new(&p, &f, 60.0, 20.0)
                .with_electricity_rate(0.15)
                .with_failure_rate(0.05),
        );
        assert_relative_eq!(engine.quick_calculate(&estimate), full.total, epsilon = 1e-12);
    }

    #[test]
    fn quick_estimate_defaults_come_from_config() {
        let engine = engine();
        let estimate = QuickEstimate {
            print_time_minutes: 60.0,
            filament_grams: 20.0,
            ..Default::default()
        };
        // Built-in defaults match the reference print.
        assert_relative_eq!(engine.quick_calculate(&estimate), 0.578 / 0.95, epsilon = 1e-12);
    }

    #[test]
    fn breakdown_survives_json() {
        let (p, f) = (printer(), filament());
        let b = engine().calculate(&CalculationRequest::new(&p, &f, 60.0, 20.0));
        let json = serde_json::to_string(&b).unwrap();
        let back: CostBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn display_lists_every_component() {
        let (p, f) = (printer(), filament());
        let text = engine()
            .calculate(&CalculationRequest::new(&p, &f, 60.0, 20.0))
            .to_string();
        for label in ["Filament", "Electricity", "Depreciation", "Consumables", "Labor", "Total"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
