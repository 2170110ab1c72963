//! True-cost calculator for 3D print jobs.
//!
//! Prices a print from its filament, energy, machine depreciation, wear
//! parts and labor, buffers the result against the expected failure rate,
//! applies markup, and compares alternative setups.
//!
//! ```
//! use print_cost::{CalculationRequest, CostConfig, CostEngine, Filament, FilamentRecord,
//!     Printer, PrinterRecord};
//!
//! let config = CostConfig::default();
//! let printer = Printer::from_record(PrinterRecord { id: "mk4".into(), ..Default::default() }, &config);
//! let filament = Filament::from_record(FilamentRecord { id: "pla".into(), ..Default::default() }, &config);
//!
//! let engine = CostEngine::new(config);
//! let breakdown = engine.calculate(&CalculationRequest::new(&printer, &filament, 60.0, 20.0));
//! assert!((breakdown.subtotal - 0.578).abs() < 1e-9);
//! ```

pub mod break_even;
pub mod calculator;
pub mod compare;
pub mod config;
pub mod depreciation;
pub mod error;
pub mod models;

pub use break_even::{BreakEven, analyze};
pub use calculator::{CalculationRequest, CostBreakdown, CostEngine, QuickEstimate, UsageParameters};
pub use compare::{Comparison, Scenario, ScenarioResult};
pub use config::CostConfig;
pub use depreciation::Depreciating;
pub use error::{Error, Result};
pub use models::{
    AuxiliaryModule, AuxiliaryModuleRecord, Consumable, ConsumableKind, ConsumableRecord,
    DEFAULT_REPLACEMENT_THRESHOLD, Filament, FilamentRecord, JobStatus, PrintJob, Printer,
    PrinterRecord, Replacement,
};
