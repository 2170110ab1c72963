use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};

use print_cost::{
    AuxiliaryModuleRecord, CalculationRequest, Consumable, ConsumableKind, ConsumableRecord,
    CostConfig, CostEngine, Depreciating, Filament, FilamentRecord, JobStatus, PrintJob, Printer,
    PrinterRecord, Scenario, analyze,
};

fn config() -> CostConfig {
    CostConfig::default()
}

fn printer(aux: bool) -> Printer {
    Printer::from_record(
        PrinterRecord {
            id: "printer".to_string(),
            purchase_price: Some(300.0),
            estimated_lifetime_hours: Some(5000.0),
            printing_watts: Some(120.0),
            auxiliary: aux.then(|| AuxiliaryModuleRecord {
                working_watts: Some(20.0),
                purchase_price: Some(150.0),
                estimated_lifetime_hours: Some(2500.0),
                ..Default::default()
            }),
            ..Default::default()
        },
        &config(),
    )
}

fn filament() -> Filament {
    Filament::from_record(
        FilamentRecord {
            id: "filament".to_string(),
            spool_price: Some(25.0),
            spool_weight_g: Some(1000.0),
            ..Default::default()
        },
        &config(),
    )
}

#[test]
fn reference_print_end_to_end() {
    let (p, f) = (printer(false), filament());
    let engine = CostEngine::new(config());
    let b = engine.calculate(
        &CalculationRequest::new(&p, &f, 60.0, 20.0)
            .with_electricity_rate(0.15)
            .with_failure_rate(0.05),
    );

    assert_relative_eq!(b.filament.cost, 0.5, epsilon = 1e-12);
    assert_relative_eq!(b.electricity.cost, 0.018, epsilon = 1e-12);
    assert_relative_eq!(b.depreciation.cost, 0.06, epsilon = 1e-12);
    assert_relative_eq!(b.subtotal, 0.578, epsilon = 1e-12);
    assert_relative_eq!(b.effective_cost, 0.608_421_052_631_578_9, epsilon = 1e-12);
    assert_relative_eq!(b.failure_buffer, 0.030_421_052_631_578_9, epsilon = 1e-12);
    assert_eq!(b.markup_amount, 0.0);
    assert_relative_eq!(b.total, b.effective_cost, epsilon = 1e-12);
    assert_relative_eq!(b.percentages.sum(), 100.0, epsilon = 1e-9);
}

#[test]
fn invariants_hold_across_inputs() {
    let engine = CostEngine::new(config());
    let f = filament();
    let parts: Vec<Consumable> = [ConsumableKind::Nozzle, ConsumableKind::Belt]
        .into_iter()
        .map(|kind| {
            Consumable::from_record(
                ConsumableRecord {
                    id: kind.to_string(),
                    kind: Some(kind),
                    ..Default::default()
                },
                &config(),
            )
        })
        .collect();

    for aux in [false, true] {
        let p = printer(aux);
        for (minutes, grams, failure, markup) in [
            (0.0, 0.0, 0.0, 0.0),
            (1.0, 0.2, 0.02, 5.0),
            (600.0, 240.0, 0.3, 50.0),
            (3.5, 1.0, 0.99, 0.0),
        ] {
            let b = engine.calculate(
                &CalculationRequest::new(&p, &f, minutes, grams)
                    .with_consumables(&parts)
                    .with_failure_rate(failure)
                    .with_labor(15.0, minutes / 600.0)
                    .with_markup(markup),
            );
            let sum = b.filament.cost
                + b.electricity.cost
                + b.depreciation.cost
                + b.consumables_cost
                + b.labor.cost;
            assert_relative_eq!(b.subtotal, sum, epsilon = 1e-9);
            assert_relative_eq!(
                b.total,
                b.subtotal + b.failure_buffer + b.markup_amount,
                epsilon = 1e-9
            );
            if b.subtotal > 0.0 {
                assert_relative_eq!(b.percentages.sum(), 100.0, epsilon = 1e-9);
            } else {
                assert_eq!(b.percentages.sum(), 0.0);
            }
        }
    }
}

#[test]
fn zero_lifetime_assets_do_not_depreciate() {
    let p = Printer {
        estimated_lifetime_hours: 0.0,
        ..printer(false)
    };
    assert_eq!(p.depreciation_per_hour(), 0.0);
    assert_eq!(p.total_depreciation_cost(240.0), 0.0);
}

#[test]
fn filament_geometry_round_trips() {
    let f = filament();
    for grams in [0.01, 1.0, 33.3, 999.0] {
        assert_relative_eq!(
            f.length_to_weight(f.weight_to_length(grams)),
            grams,
            max_relative = 1e-6
        );
    }
}

#[test]
fn comparator_ranks_totals() {
    let config = config();
    let p = Printer::from_record(
        PrinterRecord {
            id: "zero".to_string(),
            purchase_price: Some(0.0),
            printing_watts: Some(0.0),
            ..Default::default()
        },
        &config,
    );
    let f = Filament::from_record(
        FilamentRecord {
            id: "gram".to_string(),
            spool_price: Some(1.0),
            spool_weight_g: Some(1.0),
            ..Default::default()
        },
        &config,
    );
    let scenarios: Vec<Scenario> = [10.0, 7.0, 12.0]
        .into_iter()
        .map(|grams| {
            Scenario::new(
                format!("{grams} g"),
                CalculationRequest::new(&p, &f, 30.0, grams).with_failure_rate(0.0),
            )
        })
        .collect();

    let cmp = CostEngine::new(config).compare(&scenarios);
    let lowest: Vec<bool> = cmp.results.iter().map(|r| r.is_lowest).collect();
    let highest: Vec<bool> = cmp.results.iter().map(|r| r.is_highest).collect();
    assert_eq!(lowest, [false, true, false]);
    assert_eq!(highest, [false, false, true]);
    assert_relative_eq!(cmp.results[0].difference_from_lowest, 3.0, epsilon = 1e-12);
}

#[test]
fn break_even_examples() {
    let losing = analyze(500.0, 2.0, 1.0);
    assert!(!losing.profitable);
    assert!(losing.break_even_quantity.is_infinite());

    let winning = analyze(500.0, 2.0, 7.0);
    assert!(winning.profitable);
    assert_eq!(winning.margin_per_unit, 5.0);
    assert_eq!(winning.break_even_quantity, 100.0);
}

#[test]
fn completed_job_keeps_its_numbers() {
    let (p, f) = (printer(true), filament());
    let engine = CostEngine::new(config());
    let breakdown = engine.calculate(&CalculationRequest::new(&p, &f, 150.0, 42.0).with_markup(25.0));
    let created = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
    let finished = Utc.with_ymd_and_hms(2026, 9, 1, 10, 30, 0).unwrap();

    let job = PrintJob::new("job", "Gearbox housing", breakdown.clone(), created)
        .transition(JobStatus::Printing, created)
        .and_then(|j| j.transition(JobStatus::Completed, finished))
        .unwrap();

    assert_eq!(job.breakdown(), &breakdown);
    assert_eq!(job.completed_at(), Some(finished));
    assert!(job.transition(JobStatus::Failed, finished).is_err());

    // The caller accrues usage once, after completion.
    let used = p.record_usage(job.parameters().print_time_minutes / 60.0);
    assert_relative_eq!(used.current_hours, 2.5, epsilon = 1e-12);
}
