//! contract-invoke - Schema-bound invocation with lifecycle metrics
//!
//! This is the composition root that wires together all the components.

use async_trait::async_trait;
use contract_invoke::application::{
    InvocationFinishedListener, MetricResolver, QueueArrivalListener, QueueDepartureListener,
};
use contract_invoke::config::{load_config, Config};
use contract_invoke::domain::entities::{
    ContractOperation, ContractParameter, HandlerMethod, HandlerParameter,
};
use contract_invoke::domain::events::MetricsEvent;
use contract_invoke::domain::metric::MetricFactory;
use contract_invoke::domain::value_objects::{MetricNames, TypeRef};
use contract_invoke::infrastructure::{RateLimitConfig, RateLimitExtension, TracingExtension};
use contract_invoke::{
    json_binding, DashMapMetricsRegistry, Dispatcher, Fault, InvocationError, MetricsEventBus,
    OperationHandler, PrometheusExporter,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::fmt::format::FmtSpan;

/// Demo handler exposing integer arithmetic.
struct Calculator;

#[async_trait]
impl OperationHandler for Calculator {
    async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvocationError> {
        let operand = |i: usize| {
            args.get(i)
                .and_then(Value::as_i64)
                .ok_or_else(|| InvocationError::bad_request(format!("operand {} missing", i)))
        };

        match method {
            "add" => Ok(json!(operand(0)? + operand(1)?)),
            "divide" => {
                let divisor = operand(1)?;
                if divisor == 0 {
                    return Err(InvocationError::bad_request("division by zero"));
                }
                Ok(json!(operand(0)? / divisor))
            }
            other => Err(InvocationError::internal(format!("unknown method {}", other))),
        }
    }
}

/// One queued call.
struct Job {
    operation_id: String,
    arguments: Value,
    enqueued_at: Instant,
    reply: oneshot::Sender<Result<Value, Fault>>,
}

fn build_dispatcher(cfg: &Config) -> anyhow::Result<Dispatcher> {
    let handler: Arc<dyn OperationHandler> = Arc::new(Calculator);
    let tracing_ext = Arc::new(TracingExtension::new());
    let rate_limit = cfg.rate_limit_per_sec.map(|n| {
        Arc::new(RateLimitExtension::new(RateLimitConfig {
            max_requests: n,
            window: Duration::from_secs(1),
            burst_size: n,
        }))
    });

    // `add` takes a wrapped body destructured into (x, y)
    let add = ContractOperation::new("add", TypeRef::Integer)
        .parameter(ContractParameter::body("body", TypeRef::Named("AddRequest".to_string())));
    let add_method = HandlerMethod::new("add", TypeRef::Integer)
        .parameter(HandlerParameter::new("x", TypeRef::Integer))
        .parameter(HandlerParameter::new("y", TypeRef::Integer));

    // `divide` takes renamed query parameters
    let divide = ContractOperation::new("divide", TypeRef::Integer)
        .parameter(ContractParameter::query("dividend", TypeRef::Integer))
        .parameter(ContractParameter::query("divisor", TypeRef::Integer));
    let divide_method = HandlerMethod::new("divide", TypeRef::Integer)
        .parameter(HandlerParameter::new("a", TypeRef::Integer).alias("dividend"))
        .parameter(HandlerParameter::new("b", TypeRef::Integer).alias("divisor"));

    let dispatcher = Dispatcher::new();
    for (operation, method) in [(add, add_method), (divide, divide_method)] {
        let mut builder = json_binding(operation, handler.clone(), method)
            .handler_type("Calculator")
            .extension(tracing_ext.clone());
        if let Some(limiter) = &rate_limit {
            builder = builder.extension(limiter.clone());
        }
        dispatcher.register(builder.build()?)?;
    }

    Ok(dispatcher)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting contract-invoke prefix={} aggregate={}",
        cfg.metrics_prefix,
        cfg.aggregate_key
    );

    // ===== COMPOSITION ROOT =====

    // 1. Metrics: registry, listeners, event bus
    let registry = DashMapMetricsRegistry::global();
    let resolver = MetricResolver::new(
        registry.clone(),
        MetricFactory::new(),
        MetricNames::new(cfg.metrics_prefix.clone(), cfg.aggregate_key.clone()),
    );
    let bus = Arc::new(MetricsEventBus::new());
    bus.register(Arc::new(QueueArrivalListener::new(resolver.clone())));
    bus.register(Arc::new(QueueDepartureListener::new(resolver.clone())));
    bus.register(Arc::new(InvocationFinishedListener::new(resolver)));

    // 2. Operations
    let dispatcher = Arc::new(build_dispatcher(&cfg)?);
    tracing::info!("operations: {:?}", dispatcher.operation_ids());

    // 3. Wait queue and worker
    let (tx, mut rx) = mpsc::channel::<Job>(64);
    let worker = {
        let dispatcher = dispatcher.clone();
        let bus = bus.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let in_queue = job.enqueued_at.elapsed().as_nanos() as u64;
                bus.publish(&MetricsEvent::start_processing(&job.operation_id, in_queue));

                let started = Instant::now();
                let result = dispatcher.dispatch(&job.operation_id, job.arguments).await;
                bus.publish(&MetricsEvent::finished(
                    &job.operation_id,
                    started.elapsed().as_nanos() as u64,
                    result.is_ok(),
                ));

                let _ = job.reply.send(result);
            }
        })
    };

    // 4. Sample traffic
    let calls = [
        ("add", json!({"body": {"x": 2, "y": 40}})),
        ("divide", json!({"dividend": 84, "divisor": 2})),
        ("divide", json!({"dividend": 1, "divisor": 0})),
        ("add", json!({"body": {"x": "two"}})),
        ("multiply", json!({})),
    ];

    let mut replies = Vec::new();
    for (operation_id, arguments) in calls {
        let (reply, response) = oneshot::channel();
        bus.publish(&MetricsEvent::started(operation_id));
        tx.send(Job {
            operation_id: operation_id.to_string(),
            arguments,
            enqueued_at: Instant::now(),
            reply,
        })
        .await
        .map_err(|_| anyhow::anyhow!("worker queue closed"))?;
        replies.push((operation_id, response));
    }
    drop(tx);

    for (operation_id, response) in replies {
        match response.await? {
            Ok(value) => tracing::info!("{} -> {}", operation_id, value),
            Err(fault) => tracing::info!("{} -> {}", operation_id, serde_json::to_string(&fault)?),
        }
    }
    worker.await?;

    if bus.failures() > 0 {
        tracing::warn!("{} metrics listener failures", bus.failures());
    }

    // 5. Export
    if cfg.export_metrics {
        let exporter = PrometheusExporter::new(registry, "contract-invoke");
        print!("{}", exporter.export());
    }

    Ok(())
}
