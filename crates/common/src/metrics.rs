use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static LEAKS_PUBLISHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "obscura_leaks_published_total",
        "Total leaks accepted and persisted"
    )
    .expect("register leaks_published_total")
});

pub static REQUESTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "obscura_requests_created_total",
        "Total leak requests accepted and persisted"
    )
    .expect("register requests_created_total")
});

pub static REQUEST_LIKES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "obscura_request_likes_total",
        "Total likes applied to leak requests"
    )
    .expect("register request_likes_total")
});

pub static CORRUPT_RECORDS_DROPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "obscura_corrupt_records_dropped_total",
        "Stored records excluded from listings because they failed validation"
    )
    .expect("register corrupt_records_dropped_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    // Touch the lazies so every series is exported even before first use.
    Lazy::force(&LEAKS_PUBLISHED_TOTAL);
    Lazy::force(&REQUESTS_CREATED_TOTAL);
    Lazy::force(&REQUEST_LIKES_TOTAL);
    Lazy::force(&CORRUPT_RECORDS_DROPPED_TOTAL);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
