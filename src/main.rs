//! Print Cost Calculator
//!
//! Prices 3D print jobs from stored printers, filaments and wear parts.

mod db;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use print_cost::{
    AuxiliaryModuleRecord, CalculationRequest, Comparison, Consumable, ConsumableKind,
    ConsumableRecord, CostConfig, CostEngine, DEFAULT_REPLACEMENT_THRESHOLD, Depreciating,
    Filament, FilamentRecord, JobStatus, PrintJob, Printer, PrinterRecord, QuickEstimate,
    Scenario, break_even,
};

#[derive(Parser)]
#[command(name = "print-cost")]
#[command(about = "True-cost calculator for 3D print jobs")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "print_costs.db")]
    database: PathBuf,

    /// TOML file overriding the built-in cost defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log calculation details
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load sample printers, filaments and wear parts
    LoadSample,

    /// Add or replace a printer
    AddPrinter {
        name: String,
        #[arg(long)]
        id: Option<String>,
        /// Purchase price
        #[arg(long)]
        price: Option<f64>,
        /// Expected service life in hours
        #[arg(long)]
        lifetime: Option<f64>,
        /// Power draw while printing, in watts
        #[arg(long)]
        watts: Option<f64>,
        /// Attach an auxiliary module with this name
        #[arg(long)]
        aux_name: Option<String>,
        #[arg(long, requires = "aux_name")]
        aux_watts: Option<f64>,
        #[arg(long, requires = "aux_name")]
        aux_price: Option<f64>,
        #[arg(long, requires = "aux_name")]
        aux_lifetime: Option<f64>,
    },

    /// Add or replace a filament
    AddFilament {
        name: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        material: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Diameter in mm
        #[arg(long)]
        diameter: Option<f64>,
        /// Density in g/cm³
        #[arg(long)]
        density: Option<f64>,
        /// Spool weight in grams
        #[arg(long)]
        spool_weight: Option<f64>,
        #[arg(long)]
        spool_price: Option<f64>,
    },

    /// Add or replace a wear part
    AddConsumable {
        name: String,
        #[arg(long)]
        id: Option<String>,
        /// nozzle, build_plate, ptfe_tube, belt, hotend or other
        #[arg(long, default_value = "other", value_parser = parse_kind)]
        kind: ConsumableKind,
        /// Printer the part belongs to; shared across printers if omitted
        #[arg(long)]
        printer: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        lifetime: Option<f64>,
        /// Spares on hand
        #[arg(long)]
        quantity: Option<u32>,
    },

    /// List all printers
    ListPrinters,

    /// List all filaments
    ListFilaments,

    /// List wear parts with their wear level
    ListConsumables {
        /// Wear percentage that flags a part for replacement
        #[arg(long, default_value_t = DEFAULT_REPLACEMENT_THRESHOLD)]
        threshold: f64,
    },

    /// Record the physical replacement of a wear part
    ReplaceConsumable { id: String },

    /// Calculate the full cost of a print
    Calc {
        /// Printer ID
        printer: String,
        /// Filament ID
        filament: String,
        /// Print time in minutes
        #[arg(short, long)]
        minutes: f64,
        /// Filament used in grams
        #[arg(short, long)]
        grams: f64,
        #[command(flatten)]
        rates: Rates,
        /// Ignore wear parts
        #[arg(long)]
        no_consumables: bool,
        /// Save the result as a job with this name
        #[arg(long)]
        save: Option<String>,
    },

    /// Estimate a total without stored entities
    Quick {
        #[arg(short, long)]
        minutes: f64,
        #[arg(short, long)]
        grams: f64,
        #[arg(long)]
        price_per_gram: Option<f64>,
        #[arg(long)]
        watts: Option<f64>,
        #[arg(long)]
        printer_price: Option<f64>,
        #[arg(long)]
        lifetime: Option<f64>,
        #[command(flatten)]
        rates: Rates,
    },

    /// Compare scenarios listed in a TOML file
    Compare { file: PathBuf },

    /// Units needed to recover fixed costs
    BreakEven {
        #[arg(long)]
        fixed: f64,
        #[arg(long)]
        unit_cost: f64,
        #[arg(long)]
        price: f64,
    },

    /// List saved jobs
    Jobs,

    /// Move a job to a new status
    JobStatus {
        id: String,
        /// printing, completed or failed
        #[arg(value_parser = parse_status)]
        status: JobStatus,
    },

    /// Add or remove a job tag
    TagJob {
        id: String,
        tag: String,
        #[arg(long)]
        remove: bool,
    },
}

/// Optional rate overrides shared by `calc` and `quick`.
#[derive(clap::Args)]
struct Rates {
    /// Electricity price per kWh
    #[arg(long)]
    rate: Option<f64>,
    /// Expected failure rate, 0 to <1
    #[arg(long)]
    failure_rate: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    labor_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    labor_hours: f64,
    /// Markup percentage
    #[arg(long, default_value_t = 0.0)]
    markup: f64,
}

fn parse_kind(value: &str) -> Result<ConsumableKind, String> {
    ConsumableKind::parse(value).ok_or_else(|| format!("unknown consumable kind '{value}'"))
}

fn parse_status(value: &str) -> Result<JobStatus, String> {
    JobStatus::parse(value).ok_or_else(|| format!("unknown job status '{value}'"))
}

fn new_id(id: Option<String>) -> String {
    id.unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => CostConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CostConfig::default(),
    };

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            load_sample_data(&conn, &config)?;
            println!("Sample data loaded successfully!");
        }

        Commands::AddPrinter {
            name,
            id,
            price,
            lifetime,
            watts,
            aux_name,
            aux_watts,
            aux_price,
            aux_lifetime,
        } => {
            let record = PrinterRecord {
                id: new_id(id),
                name: Some(name),
                purchase_price: price,
                estimated_lifetime_hours: lifetime,
                current_hours: None,
                printing_watts: watts,
                auxiliary: aux_name.map(|name| AuxiliaryModuleRecord {
                    name: Some(name),
                    working_watts: aux_watts,
                    purchase_price: aux_price,
                    estimated_lifetime_hours: aux_lifetime,
                    current_hours: None,
                }),
            };
            record.validate()?;
            let printer = Printer::from_record(record, &config);
            db::upsert_printer(&conn, &printer)?;
            println!("Saved printer {} ({})", printer.name, printer.id);
        }

        Commands::AddFilament {
            name,
            id,
            material,
            color,
            diameter,
            density,
            spool_weight,
            spool_price,
        } => {
            let record = FilamentRecord {
                id: new_id(id),
                name: Some(name),
                material,
                color,
                diameter_mm: diameter,
                density,
                spool_weight_g: spool_weight,
                spool_price,
            };
            record.validate()?;
            let filament = Filament::from_record(record, &config);
            db::upsert_filament(&conn, &filament)?;
            println!(
                "Saved filament {} ({}), {:.4} per gram",
                filament.name,
                filament.id,
                filament.price_per_gram()
            );
        }

        Commands::AddConsumable {
            name,
            id,
            kind,
            printer,
            price,
            lifetime,
            quantity,
        } => {
            let record = ConsumableRecord {
                id: new_id(id),
                name: Some(name),
                kind: Some(kind),
                printer_id: printer,
                unit_price: price,
                estimated_lifetime_hours: lifetime,
                quantity,
                ..Default::default()
            };
            record.validate()?;
            let consumable = Consumable::from_record(record, &config);
            db::upsert_consumable(&conn, &consumable)?;
            println!(
                "Saved {} {} ({}), {:.4} per hour",
                consumable.kind,
                consumable.name,
                consumable.id,
                consumable.cost_per_hour()
            );
        }

        Commands::ListPrinters => {
            let printers = db::list_printers(&conn, &config)?;
            if printers.is_empty() {
                println!("No printers in database. Run 'add-printer' or 'load-sample' first.");
            } else {
                println!(
                    "{:<24} {:<38} {:>8} {:>10} {:>7}",
                    "Printer", "ID", "Watts", "Dep./h", "Wear %"
                );
                println!("{}", "-".repeat(91));
                for p in printers {
                    println!(
                        "{:<24} {:<38} {:>8.0} {:>10.4} {:>7.1}",
                        p.name,
                        p.id,
                        p.total_power_watts(),
                        p.total_depreciation_per_hour(),
                        p.wear_percentage()
                    );
                }
            }
        }

        Commands::ListFilaments => {
            let filaments = db::list_filaments(&conn, &config)?;
            if filaments.is_empty() {
                println!("No filaments in database. Run 'add-filament' or 'load-sample' first.");
            } else {
                println!("{:<24} {:<38} {:<8} {:>10}", "Filament", "ID", "Material", "Per gram");
                println!("{}", "-".repeat(83));
                for f in filaments {
                    println!(
                        "{:<24} {:<38} {:<8} {:>10.4}",
                        f.name,
                        f.id,
                        f.material,
                        f.price_per_gram()
                    );
                }
            }
        }

        Commands::ListConsumables { threshold } => {
            let consumables = db::list_consumables(&conn, &config)?;
            if consumables.is_empty() {
                println!("No wear parts in database.");
            } else {
                println!(
                    "{:<24} {:<12} {:<12} {:>8} {:>7} {:>6}",
                    "Part", "Kind", "Printer", "Per hour", "Wear %", "Spares"
                );
                println!("{}", "-".repeat(74));
                for c in consumables {
                    let flag = if c.needs_replacement(threshold) { "  REPLACE" } else { "" };
                    println!(
                        "{:<24} {:<12} {:<12} {:>8.4} {:>7.1} {:>6}{}",
                        c.name,
                        c.kind.as_str(),
                        c.printer_id.as_deref().unwrap_or("shared"),
                        c.cost_per_hour(),
                        c.wear_percentage(),
                        c.quantity,
                        flag
                    );
                }
            }
        }

        Commands::ReplaceConsumable { id } => {
            let Some(consumable) = db::get_consumable(&conn, &id, &config)? else {
                bail!("Consumable '{}' not found", id);
            };
            let replaced = consumable.record_replacement(Utc::now());
            db::upsert_consumable(&conn, &replaced)?;
            println!(
                "Replaced {} after {:.1} h; {} spare(s) left",
                replaced.name, consumable.current_hours, replaced.quantity
            );
        }

        Commands::Calc {
            printer,
            filament,
            minutes,
            grams,
            rates,
            no_consumables,
            save,
        } => {
            let printer = find_printer(&conn, &printer, &config)?;
            let filament = find_filament(&conn, &filament, &config)?;
            let consumables = if no_consumables {
                Vec::new()
            } else {
                db::consumables_for_printer(&conn, &printer.id, &config)?
            };

            let mut request = CalculationRequest::new(&printer, &filament, minutes, grams)
                .with_consumables(&consumables)
                .with_labor(rates.labor_rate, rates.labor_hours)
                .with_markup(rates.markup);
            request.electricity_rate = rates.rate;
            request.failure_rate = rates.failure_rate;
            request.validate()?;

            let engine = CostEngine::new(config);
            let breakdown = engine.calculate(&request);
            println!("{}", breakdown);

            if let Some(name) = save {
                let job = PrintJob::new(Uuid::new_v4().to_string(), name, breakdown, Utc::now());
                db::save_job(&conn, &job)?;
                println!("Saved job {}", job.id());
            }
        }

        Commands::Quick {
            minutes,
            grams,
            price_per_gram,
            watts,
            printer_price,
            lifetime,
            rates,
        } => {
            let estimate = QuickEstimate {
                print_time_minutes: minutes,
                filament_grams: grams,
                price_per_gram,
                printer_watts: watts,
                printer_price,
                printer_lifetime_hours: lifetime,
                electricity_rate: rates.rate,
                failure_rate: rates.failure_rate,
                labor_hourly_rate: rates.labor_rate,
                labor_hours: rates.labor_hours,
                markup_percent: rates.markup,
            };
            estimate.validate()?;
            let total = CostEngine::new(config).quick_calculate(&estimate);
            println!("Estimated total: {:.4}", total);
        }

        Commands::Compare { file } => {
            compare_from_file(&conn, &file, config)?;
        }

        Commands::BreakEven {
            fixed,
            unit_cost,
            price,
        } => {
            break_even::validate(fixed, unit_cost, price)?;
            println!("{}", break_even::analyze(fixed, unit_cost, price));
        }

        Commands::Jobs => {
            let jobs = db::list_jobs(&conn)?;
            if jobs.is_empty() {
                println!("No saved jobs. Use 'calc --save <name>' first.");
            } else {
                println!(
                    "{:<38} {:<20} {:<10} {:>10} {}",
                    "ID", "Name", "Status", "Total", "Tags"
                );
                println!("{}", "-".repeat(90));
                for job in jobs {
                    println!(
                        "{:<38} {:<20} {:<10} {:>10.4} {}",
                        job.id(),
                        job.name(),
                        job.status(),
                        job.total(),
                        job.tags().join(",")
                    );
                }
            }
        }

        Commands::JobStatus { id, status } => {
            let job = find_job(&conn, &id)?;
            let updated = job.transition(status, Utc::now())?;
            db::save_job_status(&conn, &updated, &config)?;
            println!("Job {} is now {}", updated.id(), updated.status());
        }

        Commands::TagJob { id, tag, remove } => {
            let job = find_job(&conn, &id)?;
            let updated = if remove {
                job.without_tag(&tag)
            } else {
                job.with_tag(&tag)
            };
            db::save_job(&conn, &updated)?;
            println!("Tags: {}", updated.tags().join(", "));
        }
    }

    Ok(())
}

fn find_printer(conn: &Connection, id: &str, config: &CostConfig) -> Result<Printer> {
    db::get_printer(conn, id, config)?.with_context(|| format!("Printer '{}' not found", id))
}

fn find_filament(conn: &Connection, id: &str, config: &CostConfig) -> Result<Filament> {
    db::get_filament(conn, id, config)?.with_context(|| format!("Filament '{}' not found", id))
}

fn find_job(conn: &Connection, id: &str) -> Result<PrintJob> {
    db::get_job(conn, id)?.with_context(|| format!("Job '{}' not found", id))
}

/// One scenario as written in a comparison file.
#[derive(Debug, Deserialize)]
struct ScenarioEntry {
    name: String,
    printer: String,
    filament: String,
    minutes: f64,
    grams: f64,
    #[serde(default = "default_true")]
    consumables: bool,
    electricity_rate: Option<f64>,
    failure_rate: Option<f64>,
    #[serde(default)]
    labor_rate: f64,
    #[serde(default)]
    labor_hours: f64,
    #[serde(default)]
    markup: f64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    scenario: Vec<ScenarioEntry>,
}

fn compare_from_file(conn: &Connection, path: &Path, config: CostConfig) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let comparison = compare_scenarios(conn, &source, config)
        .with_context(|| format!("Failed to compare {}", path.display()))?;
    println!("{}", comparison);
    Ok(())
}

/// Price the `[[scenario]]` entries of a TOML document against stored entities.
fn compare_scenarios(conn: &Connection, source: &str, config: CostConfig) -> Result<Comparison> {
    let file: ScenarioFile = toml::from_str(source)?;

    let mut loaded = Vec::with_capacity(file.scenario.len());
    for entry in file.scenario {
        let printer = find_printer(conn, &entry.printer, &config)?;
        let filament = find_filament(conn, &entry.filament, &config)?;
        let consumables = if entry.consumables {
            db::consumables_for_printer(conn, &printer.id, &config)?
        } else {
            Vec::new()
        };
        loaded.push((entry, printer, filament, consumables));
    }

    let mut scenarios = Vec::with_capacity(loaded.len());
    for (entry, printer, filament, consumables) in &loaded {
        let mut request = CalculationRequest::new(printer, filament, entry.minutes, entry.grams)
            .with_consumables(consumables)
            .with_labor(entry.labor_rate, entry.labor_hours)
            .with_markup(entry.markup);
        request.electricity_rate = entry.electricity_rate;
        request.failure_rate = entry.failure_rate;
        request
            .validate()
            .with_context(|| format!("Invalid scenario '{}'", entry.name))?;
        scenarios.push(Scenario::new(entry.name.clone(), request));
    }

    Ok(CostEngine::new(config).compare(&scenarios))
}

/// Load sample printers, filaments and wear parts
fn load_sample_data(conn: &Connection, config: &CostConfig) -> Result<()> {
    db::clear_all(conn)?;

    let printers = [
        PrinterRecord {
            id: "mk4".to_string(),
            name: Some("Prusa MK4".to_string()),
            purchase_price: Some(1099.0),
            estimated_lifetime_hours: Some(8000.0),
            printing_watts: Some(80.0),
            ..Default::default()
        },
        PrinterRecord {
            id: "x1c".to_string(),
            name: Some("Bambu X1C + AMS".to_string()),
            purchase_price: Some(1199.0),
            estimated_lifetime_hours: Some(6000.0),
            printing_watts: Some(150.0),
            auxiliary: Some(AuxiliaryModuleRecord {
                name: Some("AMS".to_string()),
                working_watts: Some(12.0),
                purchase_price: Some(349.0),
                estimated_lifetime_hours: Some(5000.0),
                current_hours: None,
            }),
            ..Default::default()
        },
        PrinterRecord {
            id: "ender3".to_string(),
            name: Some("Ender 3 V2".to_string()),
            purchase_price: Some(229.0),
            estimated_lifetime_hours: Some(3000.0),
            printing_watts: Some(270.0),
            ..Default::default()
        },
    ];
    for record in printers {
        db::upsert_printer(conn, &Printer::from_record(record, config))?;
    }

    let filaments = [
        ("pla", "Generic PLA", "PLA", 1.24, 20.0),
        ("petg", "Generic PETG", "PETG", 1.27, 24.0),
        ("asa", "Prusament ASA", "ASA", 1.07, 35.0),
    ];
    for (id, name, material, density, price) in filaments {
        let record = FilamentRecord {
            id: id.to_string(),
            name: Some(name.to_string()),
            material: Some(material.to_string()),
            density: Some(density),
            spool_price: Some(price),
            ..Default::default()
        };
        db::upsert_filament(conn, &Filament::from_record(record, config))?;
    }

    let consumables = [
        ("mk4-nozzle", "0.4 brass nozzle", ConsumableKind::Nozzle, Some("mk4")),
        ("x1c-hotend", "X1C hotend", ConsumableKind::Hotend, Some("x1c")),
        ("ender-ptfe", "Capricorn PTFE", ConsumableKind::PtfeTube, Some("ender3")),
        ("pei-sheet", "Textured PEI sheet", ConsumableKind::BuildPlate, None),
    ];
    for (id, name, kind, printer_id) in consumables {
        let record = ConsumableRecord {
            id: id.to_string(),
            name: Some(name.to_string()),
            kind: Some(kind),
            printer_id: printer_id.map(str::to_string),
            quantity: Some(2),
            ..Default::default()
        };
        db::upsert_consumable(conn, &Consumable::from_record(record, config))?;
    }

    println!(
        "Loaded {} printers, {} filaments, {} wear parts",
        3,
        filaments.len(),
        consumables.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Connection, CostConfig) {
        let config = CostConfig::default();
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        load_sample_data(&conn, &config).unwrap();
        (conn, config)
    }

    #[test]
    fn scenario_file_prices_each_entry() {
        let (conn, config) = sample();
        let source = r#"
            [[scenario]]
            name = "MK4 PLA"
            printer = "mk4"
            filament = "pla"
            minutes = 120.0
            grams = 40.0

            [[scenario]]
            name = "X1C PETG"
            printer = "x1c"
            filament = "petg"
            minutes = 120.0
            grams = 40.0
            markup = 30.0
        "#;
        let cmp = compare_scenarios(&conn, source, config).unwrap();

        let names: Vec<&str> = cmp.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["MK4 PLA", "X1C PETG"]);
        assert!(cmp.results[0].is_lowest);
        assert!(cmp.results[1].is_highest);
        assert_eq!(cmp.results[1].breakdown.parameters.consumable_ids, ["pei-sheet", "x1c-hotend"]);
    }

    #[test]
    fn scenario_without_consumables_skips_wear() {
        let (conn, config) = sample();
        let source = r#"
            [[scenario]]
            name = "bare"
            printer = "mk4"
            filament = "pla"
            minutes = 60.0
            grams = 10.0
            consumables = false
        "#;
        let cmp = compare_scenarios(&conn, source, config).unwrap();
        assert_eq!(cmp.results[0].breakdown.consumables_cost, 0.0);
    }

    #[test]
    fn invalid_or_unknown_scenarios_are_rejected() {
        let (conn, config) = sample();
        let bad_rate = r#"
            [[scenario]]
            name = "doomed"
            printer = "mk4"
            filament = "pla"
            minutes = 60.0
            grams = 10.0
            failure_rate = 1.0
        "#;
        let err = compare_scenarios(&conn, bad_rate, config.clone()).unwrap_err();
        assert!(err.to_string().contains("doomed"));

        let unknown = bad_rate.replace("mk4", "missing").replace("failure_rate = 1.0", "");
        let err = compare_scenarios(&conn, &unknown, config).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
