use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref SNAPSHOTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "collector_snapshots_total",
        "Total metric snapshots recorded"
    ))
    .unwrap();
    pub static ref SNAPSHOT_VALUES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "collector_snapshot_values_total",
        "Total metric values recorded"
    ))
    .unwrap();
    pub static ref INVALID_REQUESTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "collector_invalid_requests_total",
        "Total snapshot posts rejected before reaching the database"
    ))
    .unwrap();
    pub static ref DB_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "collector_db_failures_total",
        "Total database operation failures"
    ))
    .unwrap();
    pub static ref RECORD_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "collector_record_latency_seconds",
            "Time taken to record a snapshot into the DB"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
}

pub fn init_metrics() {
    REGISTRY.register(Box::new(SNAPSHOTS_TOTAL.clone())).unwrap();
    REGISTRY
        .register(Box::new(SNAPSHOT_VALUES_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(INVALID_REQUESTS_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(DB_FAILURES_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(RECORD_LATENCY_SECONDS.clone()))
        .unwrap();
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
