use reqwest::Client;
use std::time::Duration;

/// Shared client for the solving service. No request or connect timeout is
/// set; waits are left to the transport defaults.
pub fn build_solver_client() -> Client {
    Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
