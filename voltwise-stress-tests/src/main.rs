use clap::Parser;
use std::io::Write;
use std::process;
use std::time::Duration;
use voltwise_stress_tests::checks::{Violation, ViolationKind};
use voltwise_stress_tests::metrics::Metrics;
use voltwise_stress_tests::server::ServerProcess;
use voltwise_stress_tests::worker::{self, LoadShape};
use voltwise_stress_tests::workload::WorkloadProfile;

#[derive(Parser)]
#[command(name = "voltwise-stress", about = "Voltwise analytics stress test harness")]
struct Args {
    /// How long to run (seconds)
    #[arg(long, default_value_t = 5)]
    duration: u64,

    /// Workload profile: analyze-heavy | balanced | pulse-heavy | analyze-only
    #[arg(long, default_value = "balanced")]
    workload: String,

    /// Concurrent workers
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Samples per simulation payload
    #[arg(long, default_value_t = 100_000)]
    samples: usize,

    /// Fraction of each payload replaced by junk entries
    #[arg(long, default_value_t = 0.01)]
    dirty_fraction: f64,

    /// Server-side synthetic chatter interval in milliseconds (0 disables)
    #[arg(long, default_value_t = 250)]
    chatter_ms: u64,

    /// Fail if the 5xx error rate exceeds this fraction
    #[arg(long, default_value_t = 0.01)]
    max_error_rate: f64,

    /// Fail if invariant violations exceed this count
    #[arg(long, default_value_t = 0)]
    max_violations: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let profile = WorkloadProfile::from_name(&args.workload).unwrap_or_else(|| {
        eprintln!(
            "Unknown workload {:?}. Valid values: analyze-heavy, balanced, pulse-heavy, analyze-only",
            args.workload
        );
        process::exit(3);
    });
    if !(0.0..=1.0).contains(&args.dirty_fraction) {
        eprintln!("--dirty-fraction must be between 0 and 1");
        process::exit(3);
    }

    let server = ServerProcess::build_and_spawn(args.chatter_ms).unwrap_or_else(|e| {
        eprintln!("Failed to start server: {e}");
        process::exit(3);
    });
    println!("Server ready:  {}", server.addr);

    let shape = LoadShape {
        profile,
        concurrency: args.concurrency,
        sample_count: args.samples,
        dirty_fraction: args.dirty_fraction,
        duration: Duration::from_secs(args.duration),
    };

    print!("Running {}s {} workload ", args.duration, profile.as_name());
    std::io::stdout().flush().ok();

    let dot_handle = tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await;
        loop {
            interval.tick().await;
            print!(".");
            std::io::stdout().flush().ok();
        }
    });

    let (metrics, violations) = worker::run(server.addr.to_string(), shape).await;

    dot_handle.abort();
    println!();

    drop(server);

    print_report(&args, &metrics, violations.len() as u64, profile);
    for v in &violations {
        eprintln!("VIOLATION request={} {}", v.request, describe(v));
    }

    let error_rate_exceeded = metrics.error_rate() > args.max_error_rate;
    let violations_exceeded = violations.len() as u64 > args.max_violations;

    let exit_code = if error_rate_exceeded {
        1
    } else if violations_exceeded {
        2
    } else {
        0
    };

    process::exit(exit_code);
}

fn describe(v: &Violation) -> String {
    match &v.kind {
        ViolationKind::CountMismatch { expected, actual } => {
            format!("CountMismatch: histogram holds {actual} samples, payload had {expected}")
        }
        ViolationKind::BinGap { index } => format!("BinGap: bin {index} does not abut its predecessor"),
        ViolationKind::EmptyBinWidth { index } => format!("EmptyBinWidth: bin {index}"),
        ViolationKind::NonMonotonePercentiles => "NonMonotonePercentiles".to_string(),
        ViolationKind::ElevatedBelowThreshold { index } => {
            format!("ElevatedBelowThreshold: bin {index} starts below p95")
        }
        ViolationKind::PulseOverflow { len } => format!("PulseOverflow: {len} entries returned"),
    }
}

fn print_report(args: &Args, metrics: &Metrics, violation_count: u64, profile: WorkloadProfile) {
    let pass_fail = |exceeded: bool| if exceeded { "✗" } else { "✓" };

    let error_rate_exceeded = metrics.error_rate() > args.max_error_rate;
    let violations_exceeded = violation_count > args.max_violations;
    let overall_pass = !error_rate_exceeded && !violations_exceeded;

    println!("Voltwise Stress Test Results");
    println!("============================");
    println!("Duration:              {:.1} s", args.duration as f64);
    println!("Workload:              {}", profile.as_name());
    println!("Workers:               {}", args.concurrency);
    println!("Samples per payload:   {}", format_thousands(args.samples as u64));
    println!("Dirty fraction:        {:.1}%", args.dirty_fraction * 100.0);
    println!();
    println!("Requests:              {}", format_thousands(metrics.requests_total));
    println!("Analyses:              {}", format_thousands(metrics.analyses));
    println!("Throughput:            {:.1} rps", metrics.throughput_rps());
    println!("P50 latency:           {:.1} ms", metrics.p50_ms());
    println!("P99 latency:           {:.1} ms", metrics.p99_ms());
    println!();
    println!("5xx errors:            {}", format_thousands(metrics.errors_5xx));
    println!(
        "Error rate:            {:.3}%    [threshold: {:.3}%]  {}",
        metrics.error_rate() * 100.0,
        args.max_error_rate * 100.0,
        pass_fail(error_rate_exceeded),
    );
    println!();
    println!(
        "Invariant violations:  {}        [threshold: {}]        {}",
        violation_count,
        args.max_violations,
        pass_fail(violations_exceeded),
    );
    println!();
    println!("Result: {}", if overall_pass { "PASS" } else { "FAIL" });
}

fn format_thousands(n: u64) -> String {
    if n >= 1_000_000 {
        format!("~{}M", n / 1_000_000)
    } else if n >= 1_000 {
        format!("~{}K", n / 1_000)
    } else {
        n.to_string()
    }
}
