//! Database schema and operations

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use print_cost::{
    AuxiliaryModuleRecord, Consumable, ConsumableKind, ConsumableRecord, CostBreakdown,
    CostConfig, Filament, FilamentRecord, JobStatus, PrintJob, Printer, PrinterRecord,
    Replacement,
};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS printers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            purchase_price REAL NOT NULL,
            estimated_lifetime_hours REAL NOT NULL,
            current_hours REAL NOT NULL,
            printing_watts REAL NOT NULL,
            -- Auxiliary module, all NULL when none is attached
            aux_name TEXT,
            aux_working_watts REAL,
            aux_purchase_price REAL,
            aux_lifetime_hours REAL,
            aux_current_hours REAL
        );

        CREATE TABLE IF NOT EXISTS filaments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            material TEXT NOT NULL,
            color TEXT,
            diameter_mm REAL NOT NULL,
            density REAL NOT NULL,
            spool_weight_g REAL NOT NULL,
            spool_price REAL NOT NULL
        );

        -- printer_id NULL means shared across printers
        CREATE TABLE IF NOT EXISTS consumables (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            printer_id TEXT,
            unit_price REAL NOT NULL,
            estimated_lifetime_hours REAL NOT NULL,
            current_hours REAL NOT NULL,
            current_grams REAL NOT NULL,
            prints_completed INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            last_replaced TEXT
        );

        CREATE TABLE IF NOT EXISTS consumable_replacements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            consumable_id TEXT NOT NULL,
            replaced_at TEXT NOT NULL,
            hours_used REAL NOT NULL,
            grams_used REAL NOT NULL,
            prints_completed INTEGER NOT NULL
        );

        -- Frozen calculations; the breakdown is stored as JSON
        CREATE TABLE IF NOT EXISTS print_jobs (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            printer_id TEXT NOT NULL,
            filament_id TEXT NOT NULL,
            status TEXT NOT NULL,
            total REAL NOT NULL,
            breakdown TEXT NOT NULL,
            tags TEXT NOT NULL,
            created_at TEXT NOT NULL,
            completed_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_consumables_printer ON consumables(printer_id);
        CREATE INDEX IF NOT EXISTS idx_replacements_consumable ON consumable_replacements(consumable_id);
        CREATE INDEX IF NOT EXISTS idx_jobs_created ON print_jobs(created_at);
        "#,
    )?;
    Ok(())
}

/// Clear all stored entities and jobs
pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM print_jobs;
        DELETE FROM consumable_replacements;
        DELETE FROM consumables;
        DELETE FROM filaments;
        DELETE FROM printers;
        "#,
    )?;
    Ok(())
}

/// Insert or replace a printer
pub fn upsert_printer(conn: &Connection, printer: &Printer) -> Result<()> {
    let aux = printer.auxiliary.as_ref();
    conn.execute(
        "INSERT OR REPLACE INTO printers (id, name, purchase_price, estimated_lifetime_hours,
             current_hours, printing_watts, aux_name, aux_working_watts, aux_purchase_price,
             aux_lifetime_hours, aux_current_hours)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            printer.id,
            printer.name,
            printer.purchase_price,
            printer.estimated_lifetime_hours,
            printer.current_hours,
            printer.printing_watts,
            aux.map(|a| a.name.as_str()),
            aux.map(|a| a.working_watts),
            aux.map(|a| a.purchase_price),
            aux.map(|a| a.estimated_lifetime_hours),
            aux.map(|a| a.current_hours),
        ],
    )?;
    Ok(())
}

const PRINTER_COLUMNS: &str = "id, name, purchase_price, estimated_lifetime_hours, current_hours,
     printing_watts, aux_name, aux_working_watts, aux_purchase_price, aux_lifetime_hours,
     aux_current_hours";

fn printer_record(row: &Row<'_>) -> rusqlite::Result<PrinterRecord> {
    let aux_name: Option<String> = row.get(6)?;
    let auxiliary = match aux_name {
        Some(name) => Some(AuxiliaryModuleRecord {
            name: Some(name),
            working_watts: row.get(7)?,
            purchase_price: row.get(8)?,
            estimated_lifetime_hours: row.get(9)?,
            current_hours: row.get(10)?,
        }),
        None => None,
    };
    Ok(PrinterRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        purchase_price: row.get(2)?,
        estimated_lifetime_hours: row.get(3)?,
        current_hours: row.get(4)?,
        printing_watts: row.get(5)?,
        auxiliary,
    })
}

pub fn get_printer(conn: &Connection, id: &str, config: &CostConfig) -> Result<Option<Printer>> {
    let record = conn
        .query_row(
            &format!("SELECT {PRINTER_COLUMNS} FROM printers WHERE id = ?1"),
            [id],
            printer_record,
        )
        .optional()?;
    Ok(record.map(|r| Printer::from_record(r, config)))
}

/// List all printers, ordered by name
pub fn list_printers(conn: &Connection, config: &CostConfig) -> Result<Vec<Printer>> {
    let mut stmt = conn.prepare(&format!("SELECT {PRINTER_COLUMNS} FROM printers ORDER BY name"))?;
    let rows = stmt.query_map([], printer_record)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(Printer::from_record(row?, config));
    }
    Ok(results)
}

/// Insert or replace a filament
pub fn upsert_filament(conn: &Connection, filament: &Filament) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO filaments (id, name, material, color, diameter_mm, density,
             spool_weight_g, spool_price)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            filament.id,
            filament.name,
            filament.material,
            filament.color,
            filament.diameter_mm,
            filament.density,
            filament.spool_weight_g,
            filament.spool_price,
        ],
    )?;
    Ok(())
}

const FILAMENT_COLUMNS: &str =
    "id, name, material, color, diameter_mm, density, spool_weight_g, spool_price";

fn filament_record(row: &Row<'_>) -> rusqlite::Result<FilamentRecord> {
    Ok(FilamentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        material: row.get(2)?,
        color: row.get(3)?,
        diameter_mm: row.get(4)?,
        density: row.get(5)?,
        spool_weight_g: row.get(6)?,
        spool_price: row.get(7)?,
    })
}

pub fn get_filament(conn: &Connection, id: &str, config: &CostConfig) -> Result<Option<Filament>> {
    let record = conn
        .query_row(
            &format!("SELECT {FILAMENT_COLUMNS} FROM filaments WHERE id = ?1"),
            [id],
            filament_record,
        )
        .optional()?;
    Ok(record.map(|r| Filament::from_record(r, config)))
}

pub fn list_filaments(conn: &Connection, config: &CostConfig) -> Result<Vec<Filament>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {FILAMENT_COLUMNS} FROM filaments ORDER BY name"))?;
    let rows = stmt.query_map([], filament_record)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(Filament::from_record(row?, config));
    }
    Ok(results)
}

/// Insert or replace a consumable together with its replacement history
pub fn upsert_consumable(conn: &Connection, consumable: &Consumable) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    write_consumable(&tx, consumable)?;
    tx.commit()?;
    Ok(())
}

/// Consumable writes without a transaction of their own; the caller holds one.
fn write_consumable(tx: &Connection, consumable: &Consumable) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO consumables (id, name, kind, printer_id, unit_price,
             estimated_lifetime_hours, current_hours, current_grams, prints_completed,
             quantity, last_replaced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            consumable.id,
            consumable.name,
            consumable.kind.as_str(),
            consumable.printer_id,
            consumable.unit_price,
            consumable.estimated_lifetime_hours,
            consumable.current_hours,
            consumable.current_grams,
            consumable.prints_completed,
            consumable.quantity,
            consumable.last_replaced,
        ],
    )?;
    tx.execute(
        "DELETE FROM consumable_replacements WHERE consumable_id = ?1",
        [&consumable.id],
    )?;
    for entry in consumable.replacement_history() {
        tx.execute(
            "INSERT INTO consumable_replacements (consumable_id, replaced_at, hours_used,
                 grams_used, prints_completed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                consumable.id,
                entry.replaced_at,
                entry.hours_used,
                entry.grams_used,
                entry.prints_completed,
            ],
        )?;
    }
    Ok(())
}

fn replacement_history(conn: &Connection, consumable_id: &str) -> Result<Vec<Replacement>> {
    let mut stmt = conn.prepare(
        "SELECT replaced_at, hours_used, grams_used, prints_completed
         FROM consumable_replacements
         WHERE consumable_id = ?1
         ORDER BY id",
    )?;
    let rows = stmt.query_map([consumable_id], |row| {
        Ok(Replacement {
            replaced_at: row.get(0)?,
            hours_used: row.get(1)?,
            grams_used: row.get(2)?,
            prints_completed: row.get(3)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

const CONSUMABLE_COLUMNS: &str = "id, name, kind, printer_id, unit_price, estimated_lifetime_hours,
     current_hours, current_grams, prints_completed, quantity, last_replaced";

fn consumable_record(row: &Row<'_>) -> rusqlite::Result<ConsumableRecord> {
    let kind: String = row.get(2)?;
    Ok(ConsumableRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: ConsumableKind::parse(&kind),
        printer_id: row.get(3)?,
        unit_price: row.get(4)?,
        estimated_lifetime_hours: row.get(5)?,
        current_hours: row.get(6)?,
        current_grams: row.get(7)?,
        prints_completed: row.get(8)?,
        quantity: row.get(9)?,
        last_replaced: row.get(10)?,
        replacement_history: Vec::new(),
    })
}

fn load_consumable(
    conn: &Connection,
    mut record: ConsumableRecord,
    config: &CostConfig,
) -> Result<Consumable> {
    record.replacement_history = replacement_history(conn, &record.id)?;
    Ok(Consumable::from_record(record, config))
}

pub fn get_consumable(
    conn: &Connection,
    id: &str,
    config: &CostConfig,
) -> Result<Option<Consumable>> {
    let record = conn
        .query_row(
            &format!("SELECT {CONSUMABLE_COLUMNS} FROM consumables WHERE id = ?1"),
            [id],
            consumable_record,
        )
        .optional()?;
    record.map(|r| load_consumable(conn, r, config)).transpose()
}

pub fn list_consumables(conn: &Connection, config: &CostConfig) -> Result<Vec<Consumable>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {CONSUMABLE_COLUMNS} FROM consumables ORDER BY name"))?;
    let records = stmt
        .query_map([], consumable_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    records
        .into_iter()
        .map(|r| load_consumable(conn, r, config))
        .collect()
}

/// Consumables that wear on a printer, including shared ones
pub fn consumables_for_printer(
    conn: &Connection,
    printer_id: &str,
    config: &CostConfig,
) -> Result<Vec<Consumable>> {
    Ok(list_consumables(conn, config)?
        .into_iter()
        .filter(|c| c.applies_to(printer_id))
        .collect())
}

/// Insert or replace a print job
pub fn save_job(conn: &Connection, job: &PrintJob) -> Result<()> {
    let breakdown = serde_json::to_string(job.breakdown())?;
    let tags = serde_json::to_string(job.tags())?;
    conn.execute(
        "INSERT OR REPLACE INTO print_jobs (id, name, printer_id, filament_id, status, total,
             breakdown, tags, created_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            job.id(),
            job.name(),
            job.parameters().printer_id,
            job.parameters().filament_id,
            job.status().as_str(),
            job.total(),
            breakdown,
            tags,
            job.created_at(),
            job.completed_at(),
        ],
    )?;
    Ok(())
}

/// Store a job's new status. When the job has just reached `completed`, its
/// print time and filament are added to the printer and its wear parts in the
/// same transaction, so the status and the usage are written together or not
/// at all.
pub fn save_job_status(conn: &Connection, job: &PrintJob, config: &CostConfig) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    save_job(&tx, job)?;
    if job.status() == JobStatus::Completed {
        accrue_job_usage(&tx, job, config)?;
    }
    tx.commit()?;
    Ok(())
}

fn accrue_job_usage(tx: &Connection, job: &PrintJob, config: &CostConfig) -> Result<()> {
    let params = job.parameters();
    let hours = params.print_time_minutes / 60.0;

    if let Some(printer) = get_printer(tx, &params.printer_id, config)? {
        upsert_printer(tx, &printer.record_usage(hours))?;
    }
    for id in &params.consumable_ids {
        if let Some(part) = get_consumable(tx, id, config)? {
            write_consumable(tx, &part.record_usage(hours, params.filament_grams))?;
        }
    }
    info!(job = job.id(), hours, "Accrued usage for completed job");
    Ok(())
}

struct JobRow {
    id: String,
    name: String,
    status: String,
    breakdown: String,
    tags: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

const JOB_COLUMNS: &str = "id, name, status, breakdown, tags, created_at, completed_at";

fn job_row(row: &Row<'_>) -> rusqlite::Result<JobRow> {
    Ok(JobRow {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        breakdown: row.get(3)?,
        tags: row.get(4)?,
        created_at: row.get(5)?,
        completed_at: row.get(6)?,
    })
}

fn decode_job(row: JobRow) -> Result<PrintJob> {
    let status = JobStatus::parse(&row.status)
        .ok_or_else(|| anyhow!("job {} has unknown status '{}'", row.id, row.status))?;
    let breakdown: CostBreakdown = serde_json::from_str(&row.breakdown)
        .with_context(|| format!("corrupt breakdown for job {}", row.id))?;
    let tags: Vec<String> = serde_json::from_str(&row.tags)
        .with_context(|| format!("corrupt tags for job {}", row.id))?;
    Ok(PrintJob::restore(
        row.id,
        row.name,
        breakdown,
        status,
        row.created_at,
        row.completed_at,
        tags,
    ))
}

pub fn get_job(conn: &Connection, id: &str) -> Result<Option<PrintJob>> {
    let row = conn
        .query_row(
            &format!("SELECT {JOB_COLUMNS} FROM print_jobs WHERE id = ?1"),
            [id],
            job_row,
        )
        .optional()?;
    row.map(decode_job).transpose()
}

/// List jobs, newest first
pub fn list_jobs(conn: &Connection) -> Result<Vec<PrintJob>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {JOB_COLUMNS} FROM print_jobs ORDER BY created_at DESC"
    ))?;
    let rows = stmt
        .query_map([], job_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(decode_job).collect()
}
