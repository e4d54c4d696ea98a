//! Integration tests for the event-driven metrics registry
//!
//! Events flow through the bus into listeners that get-or-create metrics
//! in a shared registry.

use contract_invoke::application::{
    InvocationFinishedListener, MetricResolver, QueueArrivalListener, QueueDepartureListener,
};
use contract_invoke::domain::events::{MetricsEvent, MetricsEventKind};
use contract_invoke::domain::metric::{Metric, MetricFactory, MetricSnapshot};
use contract_invoke::domain::value_objects::MetricNames;
use contract_invoke::{DashMapMetricsRegistry, MetricsEventBus, MetricsRegistry, PrometheusExporter};
use std::sync::Arc;
use tracing_test::traced_test;

fn wired() -> (Arc<DashMapMetricsRegistry>, MetricsEventBus) {
    let registry = Arc::new(DashMapMetricsRegistry::new());
    let resolver = MetricResolver::new(registry.clone(), MetricFactory::new(), MetricNames::default());

    let bus = MetricsEventBus::new();
    bus.register(Arc::new(QueueArrivalListener::new(resolver.clone())));
    bus.register(Arc::new(QueueDepartureListener::new(resolver.clone())));
    bus.register(Arc::new(InvocationFinishedListener::new(resolver)));
    (registry, bus)
}

fn count(registry: &DashMapMetricsRegistry, name: &str) -> Option<i64> {
    registry.get_metric(name).and_then(|m| m.count_value())
}

fn timer(registry: &DashMapMetricsRegistry, name: &str) -> (u64, u64) {
    match registry.get_metric(name).map(|m| m.snapshot()) {
        Some(MetricSnapshot::Timer {
            count, total_nanos, ..
        }) => (count, total_nanos),
        other => panic!("expected timer {}, got {:?}", name, other),
    }
}

// ===== Registry =====

#[test]
fn test_get_metric_absent_until_created() {
    let registry = DashMapMetricsRegistry::new();

    assert!(registry.get_metric("m").is_none());
    assert!(registry.get_metric("m").is_none());

    let created = registry.get_or_create_metric(Metric::counter("m"));
    assert!(Arc::ptr_eq(&created, &registry.get_metric("m").unwrap()));
    assert!(Arc::ptr_eq(&created, &registry.get_or_create_metric(Metric::counter("m"))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_or_create_yields_one_instance() {
    let registry = Arc::new(DashMapMetricsRegistry::new());

    let tasks = (0..64).map(|_| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let metric = registry.get_or_create_metric(Metric::counter("shared"));
            metric.update(1).unwrap();
            metric
        })
    });
    let metrics: Vec<Arc<Metric>> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(metrics.iter().all(|m| Arc::ptr_eq(m, &metrics[0])));
    assert_eq!(metrics[0].count_value(), Some(64));
    assert_eq!(registry.len(), 1);
}

// ===== Queue departure =====

#[test]
fn test_departure_from_prior_state() {
    let (registry, bus) = wired();
    registry
        .get_or_create_metric(Metric::counter("invocation.add.queue.count_in_queue"))
        .update(5)
        .unwrap();
    registry
        .get_or_create_metric(Metric::counter("invocation.instance.queue.count_in_queue"))
        .update(20)
        .unwrap();

    assert_eq!(bus.publish(&MetricsEvent::start_processing("add", 2_000)), 1);

    assert_eq!(count(&registry, "invocation.add.queue.count_in_queue"), Some(4));
    assert_eq!(count(&registry, "invocation.instance.queue.count_in_queue"), Some(19));
    assert_eq!(timer(&registry, "invocation.add.queue.life_time_in_queue"), (1, 2_000));
    assert_eq!(timer(&registry, "invocation.instance.queue.life_time_in_queue"), (1, 2_000));
    assert_eq!(bus.failures(), 0);
}

#[test]
fn test_full_lifecycle() {
    let (registry, bus) = wired();

    for op in ["add", "add", "sub"] {
        bus.publish(&MetricsEvent::started(op));
    }
    assert_eq!(count(&registry, "invocation.instance.queue.count_in_queue"), Some(3));

    bus.publish(&MetricsEvent::start_processing("add", 10));
    bus.publish(&MetricsEvent::finished("add", 100, true));
    bus.publish(&MetricsEvent::start_processing("sub", 30));
    bus.publish(&MetricsEvent::finished("sub", 200, false));

    assert_eq!(count(&registry, "invocation.add.queue.count_in_queue"), Some(1));
    assert_eq!(count(&registry, "invocation.sub.queue.count_in_queue"), Some(0));
    assert_eq!(count(&registry, "invocation.instance.queue.count_in_queue"), Some(1));
    assert_eq!(timer(&registry, "invocation.instance.queue.life_time_in_queue"), (2, 40));
    assert_eq!(count(&registry, "invocation.instance.invocation.total"), Some(2));
    assert_eq!(count(&registry, "invocation.instance.invocation.failed"), Some(1));
    assert_eq!(timer(&registry, "invocation.sub.execution.time"), (1, 200));
}

#[test]
fn test_concurrent_arrivals_and_departures_balance() {
    let (registry, bus) = wired();
    let bus = Arc::new(bus);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let bus = bus.clone();
            std::thread::spawn(move || {
                let op = format!("op{}", t % 2);
                for _ in 0..250 {
                    bus.publish(&MetricsEvent::started(op.as_str()));
                    bus.publish(&MetricsEvent::start_processing(op.as_str(), 1));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(count(&registry, "invocation.op0.queue.count_in_queue"), Some(0));
    assert_eq!(count(&registry, "invocation.op1.queue.count_in_queue"), Some(0));
    assert_eq!(count(&registry, "invocation.instance.queue.count_in_queue"), Some(0));
    assert_eq!(
        timer(&registry, "invocation.instance.queue.life_time_in_queue"),
        (2_000, 2_000)
    );
    assert_eq!(bus.failures(), 0);
}

#[test]
#[traced_test]
fn test_unpaired_departure_logged_not_propagated() {
    let (registry, bus) = wired();

    assert_eq!(bus.publish(&MetricsEvent::start_processing("add", 5)), 0);
    assert_eq!(bus.failures(), 1);
    assert_eq!(count(&registry, "invocation.add.queue.count_in_queue"), Some(0));
    assert!(logs_contain("would drop below zero"));
}

#[test]
fn test_operation_named_like_aggregate_is_refused() {
    let (registry, bus) = wired();

    bus.publish(&MetricsEvent::started("add"));
    assert_eq!(bus.publish(&MetricsEvent::started("instance")), 0);
    assert_eq!(count(&registry, "invocation.instance.queue.count_in_queue"), Some(1));

    assert_eq!(bus.publish(&MetricsEvent::start_processing("instance", 5)), 0);
    assert_eq!(count(&registry, "invocation.instance.queue.count_in_queue"), Some(1));
    assert!(registry
        .get_metric("invocation.instance.queue.life_time_in_queue")
        .is_none());
    assert_eq!(bus.failures(), 2);
}

#[test]
fn test_bus_listener_counts() {
    let (_, bus) = wired();
    assert_eq!(bus.listener_count(MetricsEventKind::InvocationStarted), 1);
    assert_eq!(bus.listener_count(MetricsEventKind::InvocationStartProcessing), 1);
    assert_eq!(bus.listener_count(MetricsEventKind::InvocationFinished), 1);
}

// ===== Export =====

#[test]
fn test_prometheus_export_groups_by_family() {
    let (registry, bus) = wired();
    bus.publish(&MetricsEvent::started("add"));
    bus.publish(&MetricsEvent::start_processing("add", 42));

    let output = PrometheusExporter::new(registry, "svc").export();
    assert!(output.contains("invocation_add_queue_count_in_queue{service=\"svc\"} 0"));
    assert!(output.contains("invocation_instance_queue_life_time_in_queue_sum{service=\"svc\"} 42"));
}
