use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, TextEncoder, opts, register_histogram,
    register_int_counter, register_int_counter_vec,
};

pub static GATE_REDIRECTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "summary_gate_redirects_total",
            "Page requests redirected by the access gate"
        ),
        &["decision"]
    )
    .unwrap()
});

pub static LOGINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("summary_logins_total", "Login attempts by outcome"),
        &["outcome"]
    )
    .unwrap()
});

pub static SUMMARY_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "summary_requests_total",
        "Summarization requests issued to the backend"
    ))
    .unwrap()
});

pub static SUMMARY_REQUESTS_FAILED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "summary_requests_failed_total",
            "Summarization requests that produced no result"
        ),
        &["kind"]
    )
    .unwrap()
});

pub static SUMMARY_BATCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "summary_batch_duration_seconds",
        "Time from submission until every request in the batch has settled"
    )
    .unwrap()
});

pub static EXPORTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!("summary_exports_total", "CSV exports produced"))
        .unwrap()
});

pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
