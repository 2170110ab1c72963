//! Wear parts (nozzles, build plates, belts, ...) amortized per print hour.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::CostConfig;
use crate::depreciation::Depreciating;
use crate::error::{self, Result};

/// Wear percentage at which a part is flagged for replacement.
pub const DEFAULT_REPLACEMENT_THRESHOLD: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    Nozzle,
    BuildPlate,
    PtfeTube,
    Belt,
    Hotend,
    Other,
}

impl ConsumableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nozzle => "nozzle",
            Self::BuildPlate => "build_plate",
            Self::PtfeTube => "ptfe_tube",
            Self::Belt => "belt",
            Self::Hotend => "hotend",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nozzle" => Some(Self::Nozzle),
            "build_plate" => Some(Self::BuildPlate),
            "ptfe_tube" => Some(Self::PtfeTube),
            "belt" => Some(Self::Belt),
            "hotend" => Some(Self::Hotend),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ConsumableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters captured when a part is swapped out. Never edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub replaced_at: DateTime<Utc>,
    pub hours_used: f64,
    pub grams_used: f64,
    pub prints_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub id: String,
    pub name: String,
    pub kind: ConsumableKind,
    /// `None` means the part is shared by every printer.
    pub printer_id: Option<String>,
    pub unit_price: f64,
    pub estimated_lifetime_hours: f64,
    pub current_hours: f64,
    pub current_grams: f64,
    pub prints_completed: u32,
    /// Spares on hand.
    pub quantity: u32,
    pub last_replaced: Option<DateTime<Utc>>,
    replacement_history: Vec<Replacement>,
}

impl Depreciating for Consumable {
    fn purchase_price(&self) -> f64 {
        self.unit_price
    }

    fn lifetime_hours(&self) -> f64 {
        self.estimated_lifetime_hours
    }

    fn current_hours(&self) -> f64 {
        self.current_hours
    }
}

impl Consumable {
    /// Amortized price per print hour.
    pub fn cost_per_hour(&self) -> f64 {
        self.depreciation_per_hour()
    }

    /// Amortized cost of a print of `minutes`.
    pub fn cost(&self, minutes: f64) -> f64 {
        self.depreciation_cost(minutes)
    }

    pub fn needs_replacement(&self, threshold_percent: f64) -> bool {
        self.wear_percentage() >= threshold_percent
    }

    pub fn hours_remaining(&self) -> f64 {
        (self.estimated_lifetime_hours - self.current_hours).max(0.0)
    }

    /// Whether this part wears on `printer_id`. Shared parts apply everywhere.
    pub fn applies_to(&self, printer_id: &str) -> bool {
        self.printer_id.as_deref().is_none_or(|id| id == printer_id)
    }

    pub fn replacement_history(&self) -> &[Replacement] {
        &self.replacement_history
    }

    /// Returns the part after one more print of `hours` using `grams`.
    #[must_use]
    pub fn record_usage(&self, hours: f64, grams: f64) -> Self {
        let mut next = self.clone();
        next.current_hours += hours;
        next.current_grams += grams;
        next.prints_completed += 1;
        next
    }

    /// Returns the part after a physical swap at `at`: the worn counters are
    /// archived and reset and one spare is taken from stock.
    ///
    /// This is the only way accumulated wear is cleared. Apply exactly once
    /// per swap.
    #[must_use]
    pub fn record_replacement(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.replacement_history.push(Replacement {
            replaced_at: at,
            hours_used: self.current_hours,
            grams_used: self.current_grams,
            prints_completed: self.prints_completed,
        });
        next.current_hours = 0.0;
        next.current_grams = 0.0;
        next.prints_completed = 0;
        if next.quantity == 0 {
            warn!(consumable = %self.id, "Replaced with no spares in stock");
        }
        next.quantity = next.quantity.saturating_sub(1);
        next.last_replaced = Some(at);
        next
    }

    pub fn from_record(record: ConsumableRecord, config: &CostConfig) -> Self {
        let kind = record.kind.unwrap_or(ConsumableKind::Other);
        let defaults = config.consumables.get(kind);
        Self {
            name: record.name.unwrap_or_else(|| record.id.clone()),
            id: record.id,
            kind,
            printer_id: record.printer_id,
            unit_price: record.unit_price.unwrap_or(defaults.unit_price),
            estimated_lifetime_hours: record
                .estimated_lifetime_hours
                .unwrap_or(defaults.lifetime_hours),
            current_hours: record.current_hours.unwrap_or(0.0),
            current_grams: record.current_grams.unwrap_or(0.0),
            prints_completed: record.prints_completed.unwrap_or(0),
            quantity: record.quantity.unwrap_or(1),
            last_replaced: record.last_replaced,
            replacement_history: record.replacement_history,
        }
    }

    pub fn to_record(&self) -> ConsumableRecord {
        ConsumableRecord {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            kind: Some(self.kind),
            printer_id: self.printer_id.clone(),
            unit_price: Some(self.unit_price),
            estimated_lifetime_hours: Some(self.estimated_lifetime_hours),
            current_hours: Some(self.current_hours),
            current_grams: Some(self.current_grams),
            prints_completed: Some(self.prints_completed),
            quantity: Some(self.quantity),
            last_replaced: self.last_replaced,
            replacement_history: self.replacement_history.clone(),
        }
    }
}

/// Storage shape of a [`Consumable`]; absent fields take the defaults for
/// its kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumableRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConsumableKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_lifetime_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prints_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_replaced: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replacement_history: Vec<Replacement>,
}

impl ConsumableRecord {
    /// Boundary check for user-entered values. Absent fields are not checked.
    pub fn validate(&self) -> Result<()> {
        error::non_negative_opt("unit_price", self.unit_price)?;
        error::non_negative_opt("estimated_lifetime_hours", self.estimated_lifetime_hours)?;
        error::non_negative_opt("current_hours", self.current_hours)?;
        error::non_negative_opt("current_grams", self.current_grams)
    }
}
