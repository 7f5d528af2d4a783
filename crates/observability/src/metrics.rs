//! Dispatch metrics
//!
//! Process-wide counters published through the `metrics` facade, plus an
//! in-memory latency accumulator for end-of-run summaries.

use metrics::counter;

/// A data record was enqueued into the channel of a matching route
pub fn record_routed(channel: &str) {
    counter!(
        "record_router_records_routed_total",
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// A data record matched no route and went to the default channel
pub fn record_defaulted(channel: &str) {
    counter!(
        "record_router_records_defaulted_total",
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// A data record matched no route and there was no default channel
pub fn record_dropped_unmatched() {
    counter!("record_router_records_dropped_total").increment(1);
}

/// A poison record reached `channels` channels
pub fn record_poison_broadcast(channels: usize) {
    counter!("record_router_poison_broadcast_total").increment(1);
    counter!("record_router_poison_deliveries_total").increment(channels as u64);
}

/// An enqueue failed (cancelled or channel closed)
pub fn record_dispatch_failure(channel: &str, reason: &'static str) {
    counter!(
        "record_router_dispatch_failures_total",
        "channel" => channel.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// A sink wrote one record
pub fn record_sink_write(sink: &str) {
    counter!(
        "record_router_sink_writes_total",
        "sink" => sink.to_string()
    )
    .increment(1);
}

/// A sink failed to write one record
pub fn record_sink_failure(sink: &str) {
    counter!(
        "record_router_sink_failures_total",
        "sink" => sink.to_string()
    )
    .increment(1);
}

/// Streaming mean / variance of dispatch latency (Welford)
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl LatencyStats {
    /// Add one sample, in milliseconds
    pub fn push(&mut self, value_ms: f64) {
        self.count += 1;
        let delta = value_ms - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value_ms - self.mean);
        self.min = Some(self.min.map_or(value_ms, |m| m.min(value_ms)));
        self.max = Some(self.max.map_or(value_ms, |m| m.max(value_ms)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance, 0 below two samples
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn summary(&self) -> LatencySummary {
        LatencySummary {
            count: self.count,
            mean_ms: self.mean,
            std_dev_ms: self.variance().sqrt(),
            min_ms: self.min.unwrap_or(0.0),
            max_ms: self.max.unwrap_or(0.0),
        }
    }
}

/// Snapshot of [`LatencyStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencySummary {
    pub count: u64,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl std::fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "n/a");
        }
        write!(
            f,
            "mean={:.3}ms std={:.3}ms min={:.3}ms max={:.3}ms (n={})",
            self.mean_ms, self.std_dev_ms, self.min_ms, self.max_ms, self.count
        )
    }
}
