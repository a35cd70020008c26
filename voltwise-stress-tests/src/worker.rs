use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use voltwise_client::{Client, ClientConfig};
use voltwise_common::{Result, VoltwiseError};

use crate::checks::{check_pulse, check_report, Violation, ViolationKind};
use crate::metrics::Metrics;
use crate::workload::{generate_payload, Op, WorkloadProfile};

/// Shape of the load one run applies.
#[derive(Debug, Clone, Copy)]
pub struct LoadShape {
    pub profile: WorkloadProfile,
    pub concurrency: usize,
    pub sample_count: usize,
    pub dirty_fraction: f64,
    pub duration: Duration,
}

/// Drive the server at `base_addr` with `shape.concurrency` workers for `shape.duration`.
/// Returns merged metrics and every invariant violation observed.
pub async fn run(base_addr: String, shape: LoadShape) -> (Metrics, Vec<Violation>) {
    let client = Arc::new(Client::new(ClientConfig { base_addr }));

    let handles: Vec<_> = (0..shape.concurrency.max(1))
        .map(|_| tokio::spawn(run_worker(client.clone(), shape)))
        .collect();

    let mut metrics = Metrics::default();
    let mut violations = Vec::new();
    for handle in handles {
        match handle.await {
            Ok((m, v)) => {
                metrics.merge(m);
                violations.extend(v);
            }
            Err(e) => eprintln!("worker task failed: {e}"),
        }
    }
    (metrics, violations)
}

async fn run_worker(client: Arc<Client>, shape: LoadShape) -> (Metrics, Vec<Violation>) {
    let mut rng = StdRng::from_entropy();
    let mut metrics = Metrics::default();
    let mut violations = Vec::new();

    let run_start = Instant::now();
    let mut request: u64 = 0;

    while run_start.elapsed() < shape.duration {
        let op = shape.profile.sample(&mut rng);

        let op_start = Instant::now();
        let (failed, found) = execute_op(&client, op, &shape, &mut rng).await;
        metrics.latency_ms.push(op_start.elapsed().as_secs_f64() * 1_000.0);

        metrics.requests_total += 1;
        if op == Op::Analyze {
            metrics.analyses += 1;
        }
        if failed {
            metrics.errors_5xx += 1;
        }
        violations.extend(found.into_iter().map(|kind| Violation { request, kind }));
        request += 1;
    }

    metrics.elapsed_secs = run_start.elapsed().as_secs_f64();
    (metrics, violations)
}

async fn execute_op(
    client: &Client,
    op: Op,
    shape: &LoadShape,
    rng: &mut impl Rng,
) -> (bool, Vec<ViolationKind>) {
    match op {
        Op::Analyze => {
            let generated = generate_payload(rng, shape.sample_count, shape.dirty_fraction);
            let result = client.analyze(&generated.payload).await;
            let found = match &result {
                Ok(report) => check_report(report, generated.valid_count),
                Err(_) => Vec::new(),
            };
            (is_error(&result), found)
        }
        Op::ReadPulse => {
            let result = client.pulse().await;
            let found = result.as_ref().map(|entries| check_pulse(entries)).unwrap_or_default();
            (is_error(&result), found)
        }
        Op::PostStatus => {
            let message = format!("stress status {}", rng.gen::<u32>());
            let result = client.post_status(&message).await;
            (is_error(&result), Vec::new())
        }
    }
}

/// Returns `true` if `result` is a server-side error (5xx or network failure).
pub fn is_error<T>(result: &Result<T>) -> bool {
    match result {
        Err(VoltwiseError::NetworkError(_)) => true,
        Err(VoltwiseError::HttpError(status, _)) => *status >= 500,
        _ => false,
    }
}
