//! Display formatting shared by reports and log messages.

use time::macros::format_description;
use time::OffsetDateTime;

/// One lakh rupees.
pub const LAKH: f64 = 100_000.0;

/// `₹{value / 1e5}L` with the given number of decimals.
pub fn lakh(value: f64, decimals: usize) -> String {
    format!("₹{:.*}L", decimals, value / LAKH)
}

/// `₹{value}` with the given number of decimals.
pub fn rupees(value: f64, decimals: usize) -> String {
    format!("₹{:.*}", decimals, value)
}

/// `HH:MM:SS` (UTC) for a Unix timestamp in seconds.
pub fn clock_time(unix_secs: u64) -> String {
    let layout = format_description!("[hour]:[minute]:[second]");
    i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|t| t.format(layout).ok())
        .unwrap_or_else(|| "--:--:--".to_string())
}
