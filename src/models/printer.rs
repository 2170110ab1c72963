//! Printers and their optional auxiliary modules.

use serde::{Deserialize, Serialize};

use crate::config::CostConfig;
use crate::depreciation::{Depreciating, MINUTES_PER_HOUR};
use crate::error::{self, Result};

/// A sub-system attached to a printer (multi-material unit, enclosure
/// heater, ...) with its own power draw and depreciation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryModule {
    pub name: String,
    /// Draw while the printer is working, in watts.
    pub working_watts: f64,
    pub purchase_price: f64,
    pub estimated_lifetime_hours: f64,
    pub current_hours: f64,
}

impl Depreciating for AuxiliaryModule {
    fn purchase_price(&self) -> f64 {
        self.purchase_price
    }

    fn lifetime_hours(&self) -> f64 {
        self.estimated_lifetime_hours
    }

    fn current_hours(&self) -> f64 {
        self.current_hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printer {
    pub id: String,
    pub name: String,
    pub purchase_price: f64,
    pub estimated_lifetime_hours: f64,
    pub current_hours: f64,
    /// Draw while printing, in watts.
    pub printing_watts: f64,
    pub auxiliary: Option<AuxiliaryModule>,
}

impl Depreciating for Printer {
    fn purchase_price(&self) -> f64 {
        self.purchase_price
    }

    fn lifetime_hours(&self) -> f64 {
        self.estimated_lifetime_hours
    }

    fn current_hours(&self) -> f64 {
        self.current_hours
    }
}

impl Printer {
    /// Combined draw of the printer and any attached module while printing.
    pub fn total_power_watts(&self) -> f64 {
        self.printing_watts + self.auxiliary.as_ref().map_or(0.0, |aux| aux.working_watts)
    }

    /// Energy cost of a run at `rate_per_kwh`.
    pub fn electricity_cost(&self, minutes: f64, rate_per_kwh: f64) -> f64 {
        let kwh = self.total_power_watts() / 1000.0 * minutes / MINUTES_PER_HOUR;
        kwh * rate_per_kwh
    }

    /// Per-hour depreciation of the printer plus its auxiliary module.
    pub fn total_depreciation_per_hour(&self) -> f64 {
        self.depreciation_per_hour()
            + self
                .auxiliary
                .as_ref()
                .map_or(0.0, Depreciating::depreciation_per_hour)
    }

    /// Depreciation of the printer plus its auxiliary module over a run.
    pub fn total_depreciation_cost(&self, minutes: f64) -> f64 {
        self.depreciation_cost(minutes)
            + self
                .auxiliary
                .as_ref()
                .map_or(0.0, |aux| aux.depreciation_cost(minutes))
    }

    /// Returns the printer after `hours` more of operation. The attached
    /// module runs whenever the printer does, so it accrues the same hours.
    ///
    /// Apply once per completed job; nothing here guards against replays.
    #[must_use]
    pub fn record_usage(&self, hours: f64) -> Self {
        let mut next = self.clone();
        next.current_hours += hours;
        if let Some(aux) = next.auxiliary.as_mut() {
            aux.current_hours += hours;
        }
        next
    }

    /// Build a printer from a possibly partial record.
    pub fn from_record(record: PrinterRecord, config: &CostConfig) -> Self {
        let defaults = &config.printer;
        Self {
            name: record.name.unwrap_or_else(|| record.id.clone()),
            id: record.id,
            purchase_price: record.purchase_price.unwrap_or(defaults.purchase_price),
            estimated_lifetime_hours: record
                .estimated_lifetime_hours
                .unwrap_or(defaults.lifetime_hours),
            current_hours: record.current_hours.unwrap_or(0.0),
            printing_watts: record.printing_watts.unwrap_or(defaults.printing_watts),
            auxiliary: record
                .auxiliary
                .map(|aux| AuxiliaryModule::from_record(aux, config)),
        }
    }

    pub fn to_record(&self) -> PrinterRecord {
        PrinterRecord {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            purchase_price: Some(self.purchase_price),
            estimated_lifetime_hours: Some(self.estimated_lifetime_hours),
            current_hours: Some(self.current_hours),
            printing_watts: Some(self.printing_watts),
            auxiliary: self.auxiliary.as_ref().map(AuxiliaryModule::to_record),
        }
    }
}

impl AuxiliaryModule {
    pub fn from_record(record: AuxiliaryModuleRecord, config: &CostConfig) -> Self {
        let defaults = &config.auxiliary;
        Self {
            name: record.name.unwrap_or_else(|| "Auxiliary module".to_string()),
            working_watts: record.working_watts.unwrap_or(defaults.working_watts),
            purchase_price: record.purchase_price.unwrap_or(defaults.purchase_price),
            estimated_lifetime_hours: record
                .estimated_lifetime_hours
                .unwrap_or(defaults.lifetime_hours),
            current_hours: record.current_hours.unwrap_or(0.0),
        }
    }

    pub fn to_record(&self) -> AuxiliaryModuleRecord {
        AuxiliaryModuleRecord {
            name: Some(self.name.clone()),
            working_watts: Some(self.working_watts),
            purchase_price: Some(self.purchase_price),
            estimated_lifetime_hours: Some(self.estimated_lifetime_hours),
            current_hours: Some(self.current_hours),
        }
    }
}

/// Storage shape of a [`Printer`]; absent fields take configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrinterRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_lifetime_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printing_watts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<AuxiliaryModuleRecord>,
}

impl PrinterRecord {
    /// Boundary check for user-entered values. Absent fields are not checked.
    pub fn validate(&self) -> Result<()> {
        error::non_negative_opt("purchase_price", self.purchase_price)?;
        error::non_negative_opt("estimated_lifetime_hours", self.estimated_lifetime_hours)?;
        error::non_negative_opt("current_hours", self.current_hours)?;
        error::non_negative_opt("printing_watts", self.printing_watts)?;
        self.auxiliary
            .as_ref()
            .map_or(Ok(()), AuxiliaryModuleRecord::validate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryModuleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_watts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_lifetime_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hours: Option<f64>,
}

impl AuxiliaryModuleRecord {
    pub fn validate(&self) -> Result<()> {
        error::non_negative_opt("aux_working_watts", self.working_watts)?;
        error::non_negative_opt("aux_purchase_price", self.purchase_price)?;
        error::non_negative_opt("aux_lifetime_hours", self.estimated_lifetime_hours)?;
        error::non_negative_opt("aux_current_hours", self.current_hours)
    }
}
