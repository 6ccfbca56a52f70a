//! Many virtual users against the same services at once

mod common;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use bloomload_core::application::{shutdown_channel, LoadProfile, LoadTest};
use bloomload_core::domain::ItemPayload;
use bloomload_core::port::time_provider::SystemTimeProvider;
use common::{dual_scenario, http_sender, MockInventory, Reply};

const VUS: u64 = 10;

fn names(inventory: &MockInventory) -> Vec<String> {
    inventory
        .received()
        .iter()
        .map(|r| ItemPayload::from_form(&r.body).unwrap().name)
        .collect()
}

/// "Bouquet 7-3" -> (7, 3)
fn parse_name(name: &str) -> (u64, u64) {
    let suffix = name.strip_prefix("Bouquet ").unwrap();
    let (worker, iteration) = suffix.split_once('-').unwrap();
    (worker.parse().unwrap(), iteration.parse().unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_users_send_unique_decodable_payloads() {
    let gateway = MockInventory::start(Reply::Status(201)).await;
    let direct = MockInventory::start(Reply::Status(201)).await;

    let mut scenario = dual_scenario(&gateway, &direct);
    scenario.pause = Duration::from_millis(200);

    let profile = LoadProfile {
        vus: VUS,
        duration: Duration::from_millis(2500),
        graceful_stop: Duration::from_secs(5),
    };
    let test = LoadTest::new(
        profile,
        Arc::new(scenario),
        http_sender(),
        Arc::new(SystemTimeProvider),
    );
    let (_stop_tx, stop) = shutdown_channel();

    let summary = test.run(stop).await.unwrap();

    assert_eq!(summary.vus, VUS);
    assert!(summary.iterations >= VUS);
    assert_eq!(summary.total_fails(), 0);
    assert!(summary.meets_threshold(1.0));

    // Every body decodes and every name is unique per service
    let gateway_names = names(&gateway);
    let direct_names = names(&direct);
    let gateway_set: HashSet<_> = gateway_names.iter().cloned().collect();
    let direct_set: HashSet<_> = direct_names.iter().cloned().collect();
    assert_eq!(gateway_set.len(), gateway_names.len());
    assert_eq!(direct_set.len(), direct_names.len());

    // Direct only ever sees what the gateway saw first; at most one
    // in-flight iteration per user is cut off between the two
    assert!(direct_set.is_subset(&gateway_set));
    assert!(gateway_names.len() - direct_names.len() <= VUS as usize);
    assert!(gateway_names.len() as u64 >= summary.iterations);

    // Each user numbers its iterations 0, 1, 2, ... without gaps
    let mut per_worker: BTreeMap<u64, BTreeSet<u64>> = BTreeMap::new();
    for name in &gateway_names {
        let (worker, iteration) = parse_name(name);
        per_worker.entry(worker).or_default().insert(iteration);
    }
    let workers: Vec<u64> = per_worker.keys().copied().collect();
    assert_eq!(workers, (1..=VUS).collect::<Vec<_>>());
    for iterations in per_worker.values() {
        let expected: BTreeSet<u64> = (0..iterations.len() as u64).collect();
        assert_eq!(iterations, &expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failing_gateway_does_not_stall_users() {
    let gateway = MockInventory::start(Reply::Status(503)).await;
    let direct = MockInventory::start(Reply::Status(201)).await;

    let mut scenario = dual_scenario(&gateway, &direct);
    scenario.pause = Duration::from_millis(200);

    let profile = LoadProfile {
        vus: 4,
        duration: Duration::from_millis(1500),
        graceful_stop: Duration::from_secs(5),
    };
    let test = LoadTest::new(
        profile,
        Arc::new(scenario),
        http_sender(),
        Arc::new(SystemTimeProvider),
    );
    let (_stop_tx, stop) = shutdown_channel();

    let summary = test.run(stop).await.unwrap();

    let gateway_check = summary
        .checks
        .iter()
        .find(|c| c.name == "gateway status is 201")
        .unwrap();
    let direct_check = summary
        .checks
        .iter()
        .find(|c| c.name == "direct status is 201")
        .unwrap();
    assert_eq!(gateway_check.passes, 0);
    assert!(gateway_check.fails >= 4);
    assert_eq!(direct_check.fails, 0);
    assert!(direct_check.passes >= 4);
    assert!(!summary.meets_threshold(0.9));
}
