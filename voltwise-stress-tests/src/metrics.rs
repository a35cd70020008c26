use voltwise_common::percentile;

#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub requests_total: u64,
    pub analyses: u64,
    pub errors_5xx: u64,
    /// One entry per completed request, in insertion order (unsorted).
    pub latency_ms: Vec<f64>,
    pub elapsed_secs: f64,
}

impl Metrics {
    /// Fold another worker's counters into this one. Elapsed time is the longest of the two.
    pub fn merge(&mut self, other: Metrics) {
        self.requests_total += other.requests_total;
        self.analyses += other.analyses;
        self.errors_5xx += other.errors_5xx;
        self.latency_ms.extend(other.latency_ms);
        self.elapsed_secs = self.elapsed_secs.max(other.elapsed_secs);
    }

    pub fn p50_ms(&self) -> f64 {
        percentile(&self.latency_ms, 0.50).unwrap_or(0.0)
    }

    pub fn p99_ms(&self) -> f64 {
        percentile(&self.latency_ms, 0.99).unwrap_or(0.0)
    }

    pub fn error_rate(&self) -> f64 {
        if self.requests_total == 0 {
            return 0.0;
        }
        self.errors_5xx as f64 / self.requests_total as f64
    }

    pub fn throughput_rps(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.requests_total as f64 / self.elapsed_secs
    }
}
