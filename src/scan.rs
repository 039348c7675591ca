//! Strictly sequential TCP port range scanning.
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::{bail, Result};
use log::debug;
use serde_derive::Serialize;
use tokio::{io::AsyncWriteExt, net::TcpStream, time};

/// Per-port connect timeout. Scan duration is bounded by
/// `(end - start + 1) * PORT_TIMEOUT` in the worst case.
const PORT_TIMEOUT: Duration = Duration::from_millis(300);

/// Ports of a range that accepted a TCP connection, in ascending order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// The scanned host.
    pub host: String,
    /// Every port that accepted a connection, in the order scanned.
    pub open_ports: Vec<u16>,
}

/// Scans an inclusive port range against one host.
///
/// Ports are probed one at a time; there is deliberately no concurrency
/// here, so large ranges are slow. Callers should warn accordingly before
/// starting a big scan.
#[derive(Debug)]
pub struct Scanner {
    host: String,
    ports: RangeInclusive<u16>,
    timeout: Duration,
}

impl Scanner {
    /// Creates a scanner over `start..=end`.
    ///
    /// Fails when `start > end`. Both bounds are assumed to already sit in
    /// the valid port space; the CLI parser rejects 0 and anything above
    /// 65535 before we get here.
    pub fn new(host: &str, start: u16, end: u16) -> Result<Self> {
        if start > end {
            bail!("Scan start port {start} is greater than end port {end}");
        }

        Ok(Self {
            host: host.to_owned(),
            ports: start..=end,
            timeout: PORT_TIMEOUT,
        })
    }

    /// Worst-case wall-clock duration of the scan, for warning callers
    /// about large ranges.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        let count = u32::from(self.ports.end() - self.ports.start()) + 1;
        self.timeout * count
    }

    /// Runs the scan and collects the open ports.
    ///
    /// Each port gets one bounded-timeout connect attempt; refused and
    /// timed-out ports are simply skipped. Successful streams are shut down
    /// immediately so no socket outlives its attempt.
    pub async fn run(&self) -> ScanResult {
        let mut open_ports = Vec::new();

        for port in self.ports.clone() {
            match time::timeout(self.timeout, TcpStream::connect((self.host.as_str(), port))).await
            {
                Ok(Ok(mut stream)) => {
                    debug!("Open {}:{port}", self.host);
                    if let Err(e) = stream.shutdown().await {
                        debug!("Shutdown stream error {e}");
                    }
                    open_ports.push(port);
                }
                Ok(Err(_)) | Err(_) => {}
            }
        }

        debug!(
            "Scanned {} ports on {}, {} open",
            u32::from(self.ports.end() - self.ports.start()) + 1,
            self.host,
            open_ports.len()
        );

        ScanResult {
            host: self.host.clone(),
            open_ports,
        }
    }
}
