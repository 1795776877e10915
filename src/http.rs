//! Shared HTTP client construction.
//!
//! A single blocking client is built once in `main` and handed by reference to the
//! inventory fetcher, file downloader, and healthcheck ping. All three share the
//! same fixed user-agent and socket timeout, mirroring the original tool's
//! process-wide `socket.setdefaulttimeout(60)`.

use std::time::Duration;

pub const USER_AGENT: &str = concat!("mapsyncd/", env!("CARGO_PKG_VERSION"));

const SOCKET_TIMEOUT: Duration = Duration::from_secs(60);

pub fn build_client() -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(SOCKET_TIMEOUT)
        .timeout(SOCKET_TIMEOUT)
        .build()
}
