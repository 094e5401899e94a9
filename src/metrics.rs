use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: Counter =
        register_counter!("crpt_submissions_total", "Total submissions accepted into the queue").unwrap();
    pub static ref SENDS_TOTAL: Counter =
        register_counter!("crpt_sends_total", "Total submissions handed to the transport successfully").unwrap();
    pub static ref SEND_FAILURES: Counter =
        register_counter!("crpt_send_failures_total", "Total sends that failed or were cancelled").unwrap();
    pub static ref DROPPED_TOTAL: Counter =
        register_counter!("crpt_dropped_total", "Total submissions lost after leaving the queue").unwrap();
    pub static ref QUEUE_DEPTH: Gauge =
        register_gauge!("crpt_queue_depth", "Submissions waiting for a free slot").unwrap();
    pub static ref SEND_LATENCY: Histogram = register_histogram!(
        "crpt_send_latency_seconds",
        "Transport send latency in seconds"
    )
    .unwrap();
}

// Text exposition of every registered metric
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metrics() {
        SUBMISSIONS_TOTAL.inc();
        QUEUE_DEPTH.set(0.0);
        let text = render().unwrap();
        assert!(text.contains("crpt_submissions_total"));
        assert!(text.contains("crpt_queue_depth"));
    }
}
