//! Criterion benchmarks for DestinationRule validation
//!
//! Measures the checker across inventory shapes:
//! - Single rule: one local host with two subsets
//! - Batch: many namespaces, each with a service, workloads and a rule
//! - Classify: capability flags for a VirtualService with many rules

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use meshcheck_common::crd::{
    DestinationRule, HttpRoute, ObjectMeta, RegistryStatus, RouteDestination, TcpRoute,
    VirtualService, VirtualServiceSpec,
};
use meshcheck_validation::{
    validate_destination_rules, CapabilitySet, DestinationRuleChecker, Inventory,
    ResolutionContext, ResolverConfig, ServiceRecord, WorkloadRecord,
};

// =============================================================================
// Fixtures
// =============================================================================

fn reviews_rule(namespace: &str) -> DestinationRule {
    DestinationRule::new("reviews", namespace, "reviews")
        .with_subset("v1", [("version", "v1")])
        .with_subset("v2", [("version", "v2")])
}

fn build_inventory(namespaces: usize, workloads_per_ns: usize) -> Inventory {
    let mut inventory = Inventory::new()
        .with_namespaces((0..namespaces).map(|i| format!("ns-{}", i)));
    for i in 0..namespaces {
        let ns = format!("ns-{}", i);
        inventory = inventory.with_service(
            ServiceRecord::new("reviews", ns.as_str()).with_selector([("app", "reviews")]),
        );
        for w in 0..workloads_per_ns {
            let version = format!("v{}", w % 3 + 1);
            inventory = inventory.with_workload(WorkloadRecord::new(
                format!("reviews-{}", w),
                ns.as_str(),
                [("app", "reviews"), ("version", version.as_str())],
            ));
        }
    }
    let registry: Vec<RegistryStatus> = (0..namespaces)
        .map(|i| RegistryStatus::new(format!("ratings.ns-{}.svc.cluster.local", i)))
        .collect();
    inventory.add_registry(&registry);
    inventory
}

fn shifting_service(rules: usize) -> VirtualService {
    let http = (0..rules)
        .map(|i| HttpRoute {
            route: vec![
                RouteDestination::to("reviews").subset("v1").weight(90),
                RouteDestination::to("reviews").subset("v2").weight(10),
            ],
            timeout: (i % 2 == 0).then(|| "1.5s".to_string()),
            ..Default::default()
        })
        .collect();
    let tcp = vec![TcpRoute {
        match_: Vec::new(),
        route: vec![RouteDestination::to("tcp-echo")],
    }];
    VirtualService::new(
        ObjectMeta::new("reviews", "bookinfo"),
        VirtualServiceSpec {
            http,
            tcp,
            ..Default::default()
        },
    )
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_single");

    let ctx = ResolutionContext::new("bookinfo")
        .with_services([ServiceRecord::new("reviews", "bookinfo")])
        .with_workloads([
            WorkloadRecord::new("reviews-v1", "bookinfo", [("version", "v1")]),
            WorkloadRecord::new("reviews-v2", "bookinfo", [("version", "v2")]),
        ]);
    let rule = reviews_rule("bookinfo");
    let checker = DestinationRuleChecker::default();

    group.bench_function("local_host", |b| {
        b.iter(|| black_box(checker.check(&rule, &ctx)));
    });

    let external = DestinationRule::new("ratings", "bookinfo", "ratings.other.svc.cluster.local");
    group.bench_function("unresolved_host", |b| {
        b.iter(|| black_box(checker.check(&external, &ctx)));
    });

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_batch");

    for (namespaces, workloads) in [(10, 5), (50, 10), (200, 20)] {
        let inventory = build_inventory(namespaces, workloads);
        let rules: Vec<DestinationRule> = (0..namespaces)
            .map(|i| reviews_rule(&format!("ns-{}", i)))
            .collect();
        let config = ResolverConfig::default();

        group.bench_with_input(
            BenchmarkId::new("namespaces_workloads", format!("{}ns_{}w", namespaces, workloads)),
            &(),
            |b, _| {
                b.iter(|| black_box(validate_destination_rules(&rules, &inventory, &config)));
            },
        );
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for rules in [1, 10, 100] {
        let service = shifting_service(rules);
        group.bench_with_input(BenchmarkId::new("http_rules", rules), &service, |b, vs| {
            b.iter(|| black_box(CapabilitySet::of(Some(vs))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single, bench_batch, bench_classify);
criterion_main!(benches);
