pub mod checks;
pub mod metrics;
pub mod server;
pub mod worker;
pub mod workload;
