//! Core reachability checks: one probe per target, port and protocol.
use std::net::IpAddr;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;
use serde_derive::Serialize;
use tokio::{
    io::{self, AsyncWriteExt},
    net::{TcpStream, UdpSocket},
    time,
};

use crate::address::resolve_host;
use crate::input::Protocol;

/// How long a TCP or UDP attempt may take before the target counts as down.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(1);
/// End-to-end timeout for HTTP(S) probes, including connect and TLS setup.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a single probe. Immutable once produced.
///
/// `latency_ms`, `status` and `downtime` only appear in output when a value
/// was actually observed; `port` is carried for logging but is not part of
/// the output contract.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// The host or IP that was probed.
    pub target: String,
    /// Protocol the check ran over.
    pub proto: Protocol,
    /// When the probe was started.
    pub time: DateTime<Utc>,
    /// Port the probe was aimed at. Meaningless for DNS checks.
    #[serde(skip)]
    pub port: u16,
    /// Whether the target was reachable.
    pub up: bool,
    /// Elapsed time of the successful connect or HTTP round trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// HTTP status code. 0 marks a transport-level failure, not an HTTP error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Humanized downtime, attached by the monitor loop on recovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime: Option<String>,
}

/// Runs reachability checks. One instance can probe any number of targets;
/// the HTTP client inside it is reused across monitor iterations.
#[derive(Debug)]
pub struct Prober {
    timeout: Duration,
    http_client: reqwest::Client,
}

impl Prober {
    /// Builds a prober with the default timeouts.
    ///
    /// Certificate validation is off on purpose: this is a diagnostics tool
    /// pointed at arbitrary and self-signed endpoints. An UP result over
    /// HTTPS is a reachability statement, not a trust statement.
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            timeout: SOCKET_TIMEOUT,
            http_client,
        })
    }

    /// Probes `target` once over `proto`.
    ///
    /// Never fails: connection errors, timeouts and resolution failures are
    /// all absorbed into `up = false`.
    pub async fn probe(&self, target: &str, port: u16, proto: Protocol) -> CheckResult {
        let time = Utc::now();

        let (up, latency_ms, status) = match proto {
            Protocol::Tcp => {
                let (up, latency_ms) = self.check_tcp(target, port).await;
                (up, latency_ms, None)
            }
            Protocol::Udp => (self.check_udp(target, port).await, None, None),
            Protocol::Http | Protocol::Https => {
                self.check_http(target, port, proto == Protocol::Https).await
            }
            Protocol::Dns => (check_dns(target).await, None, None),
        };

        CheckResult {
            target: target.to_owned(),
            proto,
            time,
            port,
            up,
            latency_ms,
            status,
            downtime: None,
        }
    }

    /// Bounded-timeout TCP connect. Success means up and records the elapsed
    /// time; any error means down with no latency. The stream is shut down
    /// on every successful path so no socket outlives the probe.
    async fn check_tcp(&self, target: &str, port: u16) -> (bool, Option<u64>) {
        let start = Instant::now();
        match time::timeout(self.timeout, TcpStream::connect((target, port))).await {
            Ok(Ok(mut stream)) => {
                let elapsed = elapsed_ms(start);
                if let Err(e) = stream.shutdown().await {
                    debug!("Shutdown stream error {e}");
                }
                (true, Some(elapsed))
            }
            Ok(Err(e)) => {
                debug!("TCP connect to {target}:{port} failed: {e}");
                (false, None)
            }
            Err(_) => {
                debug!("TCP connect to {target}:{port} timed out");
                (false, None)
            }
        }
    }

    /// Best-effort UDP check: bind an ephemeral socket and send one probe
    /// byte. A successful write is reported as up even though it says nothing
    /// about whether anything is listening; UDP cannot reliably distinguish
    /// an open port from a silently-dropping one and this check keeps that
    /// ambiguity rather than pretending otherwise.
    async fn check_udp(&self, target: &str, port: u16) -> bool {
        let Some(ip) = resolve_host(target).await else {
            debug!("UDP probe could not resolve {target}");
            return false;
        };

        let local_addr = match ip {
            IpAddr::V4(_) => "0.0.0.0:0",
            IpAddr::V6(_) => "[::]:0",
        };

        let attempt = async {
            let socket = UdpSocket::bind(local_addr).await?;
            socket.connect((ip, port)).await?;
            socket.send(&[0x0]).await?;
            Ok::<(), io::Error>(())
        };

        match time::timeout(self.timeout, attempt).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!("UDP probe to {target}:{port} failed: {e}");
                false
            }
            Err(_) => {
                debug!("UDP probe to {target}:{port} timed out");
                false
            }
        }
    }

    /// HTTP(S) GET against `scheme://target:port`. Up means a 2xx/3xx status.
    /// Status and latency are recorded even on failure; a status of 0 flags
    /// that the request never got an HTTP response at all.
    async fn check_http(
        &self,
        target: &str,
        port: u16,
        https: bool,
    ) -> (bool, Option<u64>, Option<u16>) {
        let scheme = if https { "https" } else { "http" };
        let url = format!("{scheme}://{target}:{port}");

        let start = Instant::now();
        match self.http_client.get(&url).send().await {
            Ok(response) => {
                let elapsed = elapsed_ms(start);
                let code = response.status().as_u16();
                ((200..400).contains(&code), Some(elapsed), Some(code))
            }
            Err(e) => {
                debug!("GET {url} failed: {e}");
                (false, Some(elapsed_ms(start)), Some(0))
            }
        }
    }
}

/// DNS check: up when the hostname resolves to at least one address.
async fn check_dns(target: &str) -> bool {
    resolve_host(target).await.is_some()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
