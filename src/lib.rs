//! Library behind the `netprobe` network diagnostics CLI.
//!
//! netprobe runs one short network operation per invocation: a reachability
//! probe (TCP, UDP, HTTP, HTTPS or DNS), a sequential port range scan, a
//! GeoIP/ASN lookup against an external HTTP API, or a phone-number metadata
//! lookup. A monitor mode repeats the probe at a fixed interval and tracks
//! up/down transitions.
//!
//! The crate performs at most one network operation at a time. There is no
//! parallel probing; the only suspension point is the sleep between monitor
//! iterations.
//!
//! ## Basic Usage Example
//!
//! ```no_run
//! use netprobe::input::Protocol;
//! use netprobe::probe::Prober;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let prober = Prober::new()?;
//!
//!     // A failed probe is reported as up = false, never as an error.
//!     let result = prober.probe("127.0.0.1", 80, Protocol::Tcp).await;
//!     println!("{} is up: {}", result.target, result.up);
//!
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub mod address;

pub mod geoip;

pub mod input;

pub mod monitor;

pub mod phone;

pub mod probe;

pub mod report;

pub mod scan;
