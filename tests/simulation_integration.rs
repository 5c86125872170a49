//! ---
//! cpes_section: "07-testing-qa"
//! cpes_subsection: "integration"
//! cpes_type: "source"
//! cpes_scope: "test"
//! cpes_description: "End-to-end checks of simulated runs and scenario behaviour."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use chrono::{TimeZone, Utc};
use cpes_core::FinancialParams;
use cpes_sim::{run_scenario, SimError, SimulationConfig, SimulationEngine};

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
}

#[test]
fn baseline_day_is_fully_valid_and_reproducible() {
    let financial = FinancialParams::default();
    let config = SimulationConfig {
        include_fouling: false,
        ..Default::default()
    };

    let mut first = SimulationEngine::new(config.clone(), 1234).unwrap();
    let mut second = SimulationEngine::new(config, 1234).unwrap();
    let run_a = first.generate_from(start(), &financial).unwrap();
    let run_b = second.generate_from(start(), &financial).unwrap();

    assert_eq!(run_a.records.len(), 288);
    assert_eq!(run_a.summary.valid_count, 288);
    assert_eq!(run_a.records, run_b.records);

    for record in &run_a.records {
        assert!(record.metrics.valid);
        assert!(record.metrics.delta_t >= 0.0);
        assert!(record.metrics.cooling_load_kw.unwrap() > 0.0);
        assert!(record.metrics.plant_power_kw.unwrap() > record.reading.chiller_power_kw);
    }
    let avg = run_a.summary.avg_chiller_kw_per_tr.unwrap();
    assert!((0.5..=0.9).contains(&avg), "avg kW/TR out of band: {avg}");
}

#[test]
fn hot_weather_costs_more_power_per_tr_than_baseline() {
    let financial = FinancialParams::default();
    let base = SimulationConfig::default();

    let baseline = run_scenario("baseline", &base, 99, &financial, Some(start())).unwrap();
    let hot = run_scenario("hot weather", &base, 99, &financial, Some(start())).unwrap();

    let baseline_kw_per_tr = baseline.run.summary.avg_chiller_kw_per_tr.unwrap();
    let hot_kw_per_tr = hot.run.summary.avg_chiller_kw_per_tr.unwrap();
    assert!(
        hot_kw_per_tr > baseline_kw_per_tr,
        "expected hot weather {hot_kw_per_tr} to exceed baseline {baseline_kw_per_tr}"
    );
}

#[test]
fn peak_load_raises_average_cooling_demand() {
    let financial = FinancialParams::default();
    let base = SimulationConfig::default();

    let baseline = run_scenario("baseline", &base, 7, &financial, Some(start())).unwrap();
    let peak = run_scenario("peak_load", &base, 7, &financial, Some(start())).unwrap();

    assert!(
        peak.run.summary.avg_cooling_load_kw.unwrap()
            > baseline.run.summary.avg_cooling_load_kw.unwrap()
    );
    assert!((peak.config.load_factor - 1.0).abs() < f64::EPSILON);
}

#[test]
fn unknown_scenario_name_is_rejected() {
    let financial = FinancialParams::default();
    let base = SimulationConfig::default();
    let result = run_scenario("night purge", &base, 1, &financial, None);
    assert!(matches!(result, Err(SimError::UnknownScenario(_))));
}

#[test]
fn short_runs_honour_the_requested_span() {
    let financial = FinancialParams::default();
    let config = SimulationConfig {
        duration_hours: 1,
        timestep_minutes: 15,
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config, 5).unwrap();
    let run = engine.generate_from(start(), &financial).unwrap();
    assert_eq!(run.records.len(), 4);
    assert!((run.summary.duration_hours - 1.0).abs() < 1e-9);
}
