use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref FETCHES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "iot_client_fetches_total",
        "Total telemetry document fetch attempts"
    ))
    .unwrap();
    pub static ref FETCH_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "iot_client_fetch_failures_total",
        "Total fetches that yielded no usable document"
    ))
    .unwrap();
    pub static ref RECORDS_UPDATED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "iot_client_records_updated_total",
        "Total equipment records updated from telemetry"
    ))
    .unwrap();
    pub static ref FETCH_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "iot_client_fetch_latency_seconds",
            "Time taken to retrieve and parse the telemetry document"
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    )
    .unwrap();
    pub static ref DATA_AGE_MINUTES: Gauge = Gauge::with_opts(Opts::new(
        "iot_client_data_age_minutes",
        "Minutes since the last telemetry update reported by the device"
    ))
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(FETCHES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FETCH_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECORDS_UPDATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FETCH_LATENCY_SECONDS.clone()))?;
    REGISTRY.register(Box::new(DATA_AGE_MINUTES.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_after_init() {
        init_metrics().unwrap();
        FETCHES_TOTAL.inc();

        let text = gather_metrics().unwrap();
        assert!(text.contains("iot_client_fetches_total"));
        assert!(text.contains("iot_client_fetch_latency_seconds"));
    }
}
