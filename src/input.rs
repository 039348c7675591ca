//! Provides a means to read, parse and hold configuration options for checks.
use clap::{Parser, ValueEnum};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

const LOWEST_PORT_NUMBER: u16 = 1;
const TOP_PORT_NUMBER: u16 = 65535;

/// The closed set of protocols a probe can run over.
///
/// Dispatch happens through a single `match` in the Prober; there is no
/// extensibility requirement beyond these five cases.
#[derive(Deserialize, Serialize, Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Bounded-timeout TCP connect.
    Tcp,
    /// Best-effort single-byte UDP send.
    Udp,
    /// Plain HTTP GET.
    Http,
    /// HTTPS GET without certificate validation.
    Https,
    /// Hostname resolution check.
    Dns,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Http => "http",
            Self::Https => "https",
            Self::Dns => "dns",
        };
        f.write_str(name)
    }
}

/// Parses a single port, rejecting 0 and anything above the TCP port space.
fn parse_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str
        .parse()
        .map_err(|_| format!("Invalid port number '{port_str}'"))?;

    if port < LOWEST_PORT_NUMBER {
        return Err(format!(
            "Port {port} must be between {LOWEST_PORT_NUMBER} and {TOP_PORT_NUMBER}",
        ));
    }

    Ok(port)
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "netprobe",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
)]
#[allow(clippy::struct_excessive_bools)]
/// Network diagnostics utility: probe a host over TCP/UDP/HTTP(S)/DNS, scan a
/// port range, monitor a target continuously, or enrich it with GeoIP/ASN and
/// phone-number metadata.
/// Exactly one mode runs per invocation; precedence is
/// version > geoip > phone > portscan > check/monitor.
pub struct Opts {
    /// Target host or IP address.
    #[arg(short, long, default_value = "localhost")]
    pub target: String,

    /// Port to probe.
    #[arg(short, long, default_value = "80", value_parser = parse_port)]
    pub port: u16,

    /// Protocol for the reachability check.
    #[arg(long, value_enum, ignore_case = true, default_value = "tcp")]
    pub proto: Protocol,

    /// Emit results as pretty-printed JSON instead of a text summary.
    #[arg(short, long)]
    pub json: bool,

    /// Keep probing the target until the process is terminated.
    #[arg(short, long)]
    pub monitor: bool,

    /// Seconds to sleep between monitor iterations.
    #[arg(short, long, default_value = "5")]
    pub interval: u64,

    /// Scan a TCP port range instead of running a single check.
    #[arg(long)]
    pub portscan: bool,

    /// First port of the scan range (inclusive).
    #[arg(long, default_value = "1", value_parser = parse_port)]
    pub scanstart: u16,

    /// Last port of the scan range (inclusive).
    #[arg(long, default_value = "1024", value_parser = parse_port)]
    pub scanend: u16,

    /// Look up GeoIP and ASN metadata for the target instead of probing it.
    #[arg(long)]
    pub geoip: bool,

    /// Phone number to parse and classify. Non-empty selects phone mode.
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Custom path to the config file.
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Hide the banner.
    #[arg(long)]
    pub no_banner: bool,
}

impl Opts {
    /// Merge values found within the user configuration file into the
    /// command line arguments.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            macro_rules! merge_config {
                ($($field: ident),+) => {
                    $(
                        if let Some(e) = &config.$field {
                            self.$field = e.clone();
                        }
                    )+
                }
            }

            merge_config!(
                target, port, proto, json, monitor, interval, scanstart, scanend
            );
        }
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            target: String::from("localhost"),
            port: 80,
            proto: Protocol::Tcp,
            json: false,
            monitor: false,
            interval: 5,
            portscan: false,
            scanstart: 1,
            scanend: 1024,
            geoip: false,
            phone: String::new(),
            no_config: true,
            config_path: None,
            no_banner: false,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[derive(Debug, Deserialize)]
pub struct Config {
    target: Option<String>,
    port: Option<u16>,
    proto: Option<Protocol>,
    json: Option<bool>,
    monitor: Option<bool>,
    interval: Option<u64>,
    scanstart: Option<u16>,
    scanend: Option<u16>,
}

impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct.
    ///
    /// # Format
    ///
    /// target = "example.org"
    /// port = 443
    /// proto = "https"
    /// interval = 10
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Self {
        let mut content = String::new();
        let config_path = custom_config_path.unwrap_or_else(default_config_path);
        if config_path.exists() {
            content = fs::read_to_string(config_path).unwrap_or_default();
        }

        let config: Self = match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                println!("Found {e} in configuration file.\nAborting.\n");
                std::process::exit(1);
            }
        };

        config
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> PathBuf {
    let Some(mut config_path) = dirs::home_dir() else {
        panic!("Could not infer config file path.");
    };
    config_path.push(".netprobe.toml");
    config_path
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use parameterized::parameterized;

    use super::{parse_port, Config, Opts, Protocol};

    impl Config {
        fn sample() -> Self {
            Self {
                target: Some("example.org".to_owned()),
                port: Some(443),
                proto: Some(Protocol::Https),
                json: Some(true),
                monitor: None,
                interval: Some(30),
                scanstart: None,
                scanend: Some(2048),
            }
        }
    }

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[parameterized(input = {
        vec!["netprobe"],
        vec!["netprobe", "--proto", "dns", "--target", "example.org"],
        vec!["netprobe", "--proto", "HTTPS"],
    }, proto = {
        Protocol::Tcp,
        Protocol::Dns,
        Protocol::Https,
    })]
    fn parse_protocol(input: Vec<&str>, proto: Protocol) {
        let opts = Opts::parse_from(input);
        assert_eq!(proto, opts.proto);
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        let result = Opts::try_parse_from(["netprobe", "--proto", "icmp"]);
        assert!(result.is_err());
    }

    #[test]
    fn port_zero_is_rejected() {
        let result = Opts::try_parse_from(["netprobe", "--port", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_port_accepts_valid_ports() {
        assert_eq!(parse_port("1"), Ok(1));
        assert_eq!(parse_port("80"), Ok(80));
        assert_eq!(parse_port("65535"), Ok(65535));
    }

    #[test]
    fn parse_port_rejects_invalid_ports() {
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("abc").is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let opts = Opts::parse_from(["netprobe"]);
        assert_eq!(opts.target, "localhost");
        assert_eq!(opts.port, 80);
        assert_eq!(opts.proto, Protocol::Tcp);
        assert!(!opts.json);
        assert!(!opts.monitor);
        assert_eq!(opts.interval, 5);
        assert_eq!(opts.scanstart, 1);
        assert_eq!(opts.scanend, 1024);
        assert!(opts.phone.is_empty());
    }

    #[test]
    fn opts_no_merge_when_config_is_ignored() {
        let mut opts = Opts::default();
        let config = Config::sample();

        opts.merge(&config);

        assert_eq!(opts.target, "localhost");
        assert_eq!(opts.port, 80);
        assert_eq!(opts.proto, Protocol::Tcp);
        assert!(!opts.json);
    }

    #[test]
    fn opts_merge_config_values() {
        let mut opts = Opts {
            no_config: false,
            ..Opts::default()
        };
        let config = Config::sample();

        opts.merge(&config);

        assert_eq!(opts.target, "example.org");
        assert_eq!(opts.port, 443);
        assert_eq!(opts.proto, Protocol::Https);
        assert!(opts.json);
        assert!(!opts.monitor);
        assert_eq!(opts.interval, 30);
        assert_eq!(opts.scanstart, 1);
        assert_eq!(opts.scanend, 2048);
    }

    #[test]
    fn protocol_displays_lowercase() {
        assert_eq!(Protocol::Tcp.to_string(), "tcp");
        assert_eq!(Protocol::Https.to_string(), "https");
        assert_eq!(Protocol::Dns.to_string(), "dns");
    }
}
