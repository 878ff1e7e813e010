// tests/fleet_lifecycle.rs
// Fleet scheduling: distinct sources, idempotent start, clean teardown.

mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use common::RecordingSink;
use fleet_uplink::{Fleet, FleetConfig, RunnerConfig};

fn fast_fleet_config() -> FleetConfig {
    FleetConfig {
        size: 10,
        seed: Some(42),
        runner: RunnerConfig {
            sample_period: Duration::from_millis(200),
            flush_period: Duration::from_millis(1000),
            destination: "/app/ubicacion".into(),
        },
        ..FleetConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn ten_sources_with_distinct_ids_and_offset_starts() {
    let sink = RecordingSink::connected();
    let fleet = Fleet::new(sink.clone(), fast_fleet_config());
    fleet.start();

    let runners = fleet.runners();
    assert_eq!(runners.len(), 10);

    let ids: BTreeSet<i64> = runners.iter().map(|r| r.id()).collect();
    assert_eq!(ids, (1..=10).collect::<BTreeSet<i64>>());

    tokio::time::sleep(Duration::from_millis(1050)).await;

    let published = sink.published();
    assert_eq!(published.len(), 10, "one batch per source per flush period");
    let batch_ids: BTreeSet<i64> = published
        .iter()
        .map(|f| {
            let v: serde_json::Value = serde_json::from_slice(&f.payload).unwrap();
            v["id"].as_i64().unwrap()
        })
        .collect();
    assert_eq!(batch_ids, (1..=10).collect::<BTreeSet<i64>>());

    fleet.stop();
}

#[tokio::test(start_paused = true)]
async fn start_positions_diverge_per_source() {
    let sink = RecordingSink::connected();
    let mut cfg = fast_fleet_config();
    cfg.seed = Some(7);
    let fleet = Fleet::new(sink, cfg);
    fleet.start();

    let positions: BTreeSet<String> = fleet
        .runners()
        .iter()
        .map(|r| {
            let p = r.position();
            format!("{:.6},{:.6}", p.latitude, p.longitude)
        })
        .collect();
    assert_eq!(positions.len(), 10, "no two sources share a start position");

    fleet.stop();
}

#[tokio::test(start_paused = true)]
async fn second_start_while_running_is_a_no_op() {
    let sink = RecordingSink::connected();
    let fleet = Fleet::new(sink.clone(), fast_fleet_config());
    fleet.start();
    fleet.start();

    assert_eq!(fleet.runners().len(), 10);
    tokio::time::sleep(Duration::from_millis(1050)).await;
    assert_eq!(sink.published().len(), 10, "no duplicate runners publishing");

    fleet.stop();
}

#[tokio::test(start_paused = true)]
async fn stop_leaves_zero_live_timers() {
    let sink = RecordingSink::connected();
    let fleet = Fleet::new(sink.clone(), fast_fleet_config());
    fleet.start();
    tokio::time::sleep(Duration::from_millis(1050)).await;
    let before = sink.published().len();
    assert_eq!(before, 10);

    let runners = fleet.runners();
    fleet.stop();
    assert!(!fleet.is_running());
    assert!(runners.iter().all(|r| !r.is_running()));

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(sink.published().len(), before, "no background activity after stop");

    // stop is idempotent
    fleet.stop();
}
