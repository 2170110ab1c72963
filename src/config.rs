//! Engine configuration and default tables.
//!
//! A [`CostConfig`] is built once (from the built-in defaults or a TOML file)
//! and handed to [`CostEngine::new`](crate::CostEngine::new). It is never
//! mutated afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ConsumableKind;

/// Defaults applied by the cost engine and by the `from_record` constructors.
///
/// # Example
///
/// ```
/// use print_cost::CostConfig;
///
/// let config = CostConfig::from_toml_str("electricity_rate = 0.30").unwrap();
/// assert_eq!(config.electricity_rate, 0.30);
/// assert_eq!(config.failure_rate, 0.05);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Price per kWh.
    pub electricity_rate: f64,
    /// Expected fraction of failed prints, in `[0, 1)`.
    pub failure_rate: f64,
    pub filament: FilamentDefaults,
    pub printer: PrinterDefaults,
    pub auxiliary: AuxiliaryDefaults,
    pub consumables: ConsumableDefaultsTable,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            electricity_rate: 0.15,
            failure_rate: 0.05,
            filament: FilamentDefaults::default(),
            printer: PrinterDefaults::default(),
            auxiliary: AuxiliaryDefaults::default(),
            consumables: ConsumableDefaultsTable::default(),
        }
    }
}

impl CostConfig {
    /// Parse a TOML document. Missing keys keep their built-in default.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilamentDefaults {
    pub diameter_mm: f64,
    /// g/cm³ (PLA).
    pub density: f64,
    pub spool_weight_g: f64,
    pub spool_price: f64,
}

impl Default for FilamentDefaults {
    fn default() -> Self {
        Self {
            diameter_mm: 1.75,
            density: 1.24,
            spool_weight_g: 1000.0,
            spool_price: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterDefaults {
    pub purchase_price: f64,
    pub lifetime_hours: f64,
    pub printing_watts: f64,
}

impl Default for PrinterDefaults {
    fn default() -> Self {
        Self {
            purchase_price: 300.0,
            lifetime_hours: 5000.0,
            printing_watts: 120.0,
        }
    }
}

/// Defaults for an attached multi-material unit or similar module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxiliaryDefaults {
    pub working_watts: f64,
    pub purchase_price: f64,
    pub lifetime_hours: f64,
}

impl Default for AuxiliaryDefaults {
    fn default() -> Self {
        Self {
            working_watts: 10.0,
            purchase_price: 0.0,
            lifetime_hours: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumableDefaults {
    pub unit_price: f64,
    pub lifetime_hours: f64,
}

impl ConsumableDefaults {
    const fn new(unit_price: f64, lifetime_hours: f64) -> Self {
        Self {
            unit_price,
            lifetime_hours,
        }
    }
}

/// Per-kind wear part defaults.
///
/// A kind's table in TOML may set either key; the other keeps that kind's
/// built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialConsumableTable")]
pub struct ConsumableDefaultsTable {
    pub nozzle: ConsumableDefaults,
    pub build_plate: ConsumableDefaults,
    pub ptfe_tube: ConsumableDefaults,
    pub belt: ConsumableDefaults,
    pub hotend: ConsumableDefaults,
    pub other: ConsumableDefaults,
}

impl Default for ConsumableDefaultsTable {
    fn default() -> Self {
        Self {
            nozzle: ConsumableDefaults::new(8.0, 500.0),
            build_plate: ConsumableDefaults::new(35.0, 2000.0),
            ptfe_tube: ConsumableDefaults::new(5.0, 1000.0),
            belt: ConsumableDefaults::new(15.0, 3000.0),
            hotend: ConsumableDefaults::new(60.0, 4000.0),
            other: ConsumableDefaults::new(10.0, 1000.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConsumableDefaults {
    unit_price: Option<f64>,
    lifetime_hours: Option<f64>,
}

impl PartialConsumableDefaults {
    fn or(self, fallback: ConsumableDefaults) -> ConsumableDefaults {
        ConsumableDefaults {
            unit_price: self.unit_price.unwrap_or(fallback.unit_price),
            lifetime_hours: self.lifetime_hours.unwrap_or(fallback.lifetime_hours),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialConsumableTable {
    nozzle: PartialConsumableDefaults,
    build_plate: PartialConsumableDefaults,
    ptfe_tube: PartialConsumableDefaults,
    belt: PartialConsumableDefaults,
    hotend: PartialConsumableDefaults,
    other: PartialConsumableDefaults,
}

impl From<PartialConsumableTable> for ConsumableDefaultsTable {
    fn from(partial: PartialConsumableTable) -> Self {
        let builtin = Self::default();
        Self {
            nozzle: partial.nozzle.or(builtin.nozzle),
            build_plate: partial.build_plate.or(builtin.build_plate),
            ptfe_tube: partial.ptfe_tube.or(builtin.ptfe_tube),
            belt: partial.belt.or(builtin.belt),
            hotend: partial.hotend.or(builtin.hotend),
            other: partial.other.or(builtin.other),
        }
    }
}

impl ConsumableDefaultsTable {
    pub fn get(&self, kind: ConsumableKind) -> ConsumableDefaults {
        match kind {
            ConsumableKind::Nozzle => self.nozzle,
            ConsumableKind::BuildPlate => self.build_plate,
            ConsumableKind::PtfeTube => self.ptfe_tube,
            ConsumableKind::Belt => self.belt,
            ConsumableKind::Hotend => self.hotend,
            ConsumableKind::Other => self.other,
        }
    }
}
