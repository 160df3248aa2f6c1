use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{CounterVec, IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static BILLS_GENERATED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PAYMENTS_RECORDED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static REVENUE_BILLED_TOTAL: OnceLock<CounterVec> = OnceLock::new();
pub static PAYMENTS_AMOUNT_TOTAL: OnceLock<CounterVec> = OnceLock::new();

pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }

    // Registry for the per-agency business counters
    let registry = Registry::new();

    let bills_counter = IntCounterVec::new(
        Opts::new("bills_generated_total", "Bills generated, by agency"),
        &["agency_id"],
    )
    .expect("failed to create bills_generated_total metric");

    let payments_counter = IntCounterVec::new(
        Opts::new("payments_recorded_total", "Payments recorded, by agency"),
        &["agency_id"],
    )
    .expect("failed to create payments_recorded_total metric");

    let revenue_counter = CounterVec::new(
        Opts::new("revenue_billed_total", "Grand totals billed, by agency"),
        &["agency_id"],
    )
    .expect("failed to create revenue_billed_total metric");

    let collected_counter = CounterVec::new(
        Opts::new("payments_amount_total", "Payment amounts collected, by agency"),
        &["agency_id"],
    )
    .expect("failed to create payments_amount_total metric");

    registry
        .register(Box::new(bills_counter.clone()))
        .expect("failed to register bills_generated_total");
    registry
        .register(Box::new(payments_counter.clone()))
        .expect("failed to register payments_recorded_total");
    registry
        .register(Box::new(revenue_counter.clone()))
        .expect("failed to register revenue_billed_total");
    registry
        .register(Box::new(collected_counter.clone()))
        .expect("failed to register payments_amount_total");

    PROMETHEUS_REGISTRY
        .set(registry)
        .expect("failed to set prometheus registry");
    BILLS_GENERATED_TOTAL
        .set(bills_counter)
        .expect("failed to set bills_generated_total");
    PAYMENTS_RECORDED_TOTAL
        .set(payments_counter)
        .expect("failed to set payments_recorded_total");
    REVENUE_BILLED_TOTAL
        .set(revenue_counter)
        .expect("failed to set revenue_billed_total");
    PAYMENTS_AMOUNT_TOTAL
        .set(collected_counter)
        .expect("failed to set payments_amount_total");
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    // Append the custom prometheus metrics
    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record a generated bill and its grand total for per-agency metering.
pub fn record_bill(agency_id: &str, grand_total: f64) {
    if let Some(counter) = BILLS_GENERATED_TOTAL.get() {
        counter.with_label_values(&[agency_id]).inc();
    }
    if let Some(counter) = REVENUE_BILLED_TOTAL.get() {
        counter.with_label_values(&[agency_id]).inc_by(grand_total);
    }
}

/// Record one accepted payment for per-agency metering.
pub fn record_payment(agency_id: &str, amount: f64) {
    if let Some(counter) = PAYMENTS_RECORDED_TOTAL.get() {
        counter.with_label_values(&[agency_id]).inc();
    }
    if let Some(counter) = PAYMENTS_AMOUNT_TOTAL.get() {
        counter.with_label_values(&[agency_id]).inc_by(amount);
    }
}
