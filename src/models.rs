//! Physical assets that feed the cost engine, and frozen job results.

mod consumable;
mod filament;
mod job;
mod printer;

pub use consumable::{
    Consumable, ConsumableKind, ConsumableRecord, DEFAULT_REPLACEMENT_THRESHOLD, Replacement,
};
pub use filament::{Filament, FilamentRecord};
pub use job::{JobStatus, PrintJob};
pub use printer::{AuxiliaryModule, AuxiliaryModuleRecord, Printer, PrinterRecord};
