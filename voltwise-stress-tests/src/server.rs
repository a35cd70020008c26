use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// A `voltwise-server` child process, killed on drop.
pub struct ServerProcess {
    child: Child,
    pub addr: SocketAddr,
    // The settings file must outlive the process reading it at startup.
    _settings: NamedTempFile,
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        self.child.kill().ok();
    }
}

/// Reserve `count` free TCP ports by binding to port 0 for each and releasing
/// them together, so no port is handed out twice.
pub fn pick_free_ports(count: usize) -> std::io::Result<Vec<u16>> {
    let listeners = (0..count)
        .map(|_| TcpListener::bind("127.0.0.1:0"))
        .collect::<std::io::Result<Vec<_>>>()?;
    listeners.iter().map(|l| l.local_addr().map(|a| a.port())).collect()
}

/// Settings file contents for a server on `addr`.
pub fn settings_json(addr: SocketAddr, chatter_ms: u64) -> serde_json::Value {
    serde_json::json!({
        "address": addr.to_string(),
        "chatter_interval_ms": chatter_ms,
    })
}

/// Path of the `voltwise-server` binary next to this executable in `target/<profile>/`.
fn server_binary_path() -> Result<PathBuf, String> {
    let mut path = std::env::current_exe().map_err(|e| format!("Cannot locate own executable: {e}"))?;
    path.pop();
    if path.file_name().is_some_and(|n| n == "deps") {
        path.pop();
    }
    path.push("voltwise-server");
    Ok(path)
}

impl ServerProcess {
    /// Build `voltwise-server`, start it on a free port with synthetic chatter every
    /// `chatter_ms` (0 disables it), and wait until it accepts connections.
    pub fn build_and_spawn(chatter_ms: u64) -> Result<Self, String> {
        let status = Command::new("cargo")
            .args(["build", "-p", "voltwise-server"])
            .status()
            .map_err(|e| format!("Failed to invoke cargo build: {e}"))?;
        if !status.success() {
            return Err(format!("cargo build -p voltwise-server failed: {status}"));
        }

        let port = pick_free_ports(1)
            .map_err(|e| format!("Failed to reserve a port: {e}"))?
            .into_iter()
            .next()
            .ok_or("No port reserved")?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let settings = NamedTempFile::new().map_err(|e| format!("Failed to create settings file: {e}"))?;
        serde_json::to_writer(&settings, &settings_json(addr, chatter_ms))
            .map_err(|e| format!("Failed to write settings JSON: {e}"))?;

        let child = Command::new(server_binary_path()?)
            .arg("--config")
            .arg(settings.path())
            .spawn()
            .map_err(|e| format!("Failed to spawn server: {e}"))?;
        let server = ServerProcess { child, addr, _settings: settings };

        // On failure `server` drops here and the child is killed.
        poll_until_ready(addr, Instant::now() + READY_TIMEOUT)?;
        Ok(server)
    }
}

/// Retry a TCP connect to `addr` until it succeeds or `deadline` passes.
fn poll_until_ready(addr: SocketAddr, deadline: Instant) -> Result<(), String> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(format!("timed out waiting for {addr}"));
        }
        let attempt = Duration::min(remaining, Duration::from_millis(200));
        if TcpStream::connect_timeout(&addr, attempt).is_ok() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
