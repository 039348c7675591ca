//! Binary entry point: dispatches across the probe, scan and enrichment modes.
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::debug;

use netprobe::geoip;
use netprobe::input::{Config, Opts, Protocol};
use netprobe::monitor;
use netprobe::phone::{Libphonenumber, PhoneProvider};
use netprobe::report::Report;
use netprobe::scan::Scanner;

/// Scans longer than this get a slowness warning up front.
const SLOW_SCAN: Duration = Duration::from_secs(60);

const BANNER: &str = r"             _                  _
 _ _  ___ | |_  ___  ___ ___ | |_  ___
| ' \/ -_)|  _|| . \|  _// . \| . \/ -_)
|_||_\___| \__||  _/|_|  \___/|___/\___|
               |_|";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut opts = Opts::parse();
    if !opts.no_config {
        let config = Config::read(opts.config_path.clone());
        opts.merge(&config);
    }
    debug!("Main() `opts` arguments are {opts:?}");

    if !opts.no_banner && !opts.json {
        println!("{}", BANNER.cyan());
        println!("{}\n", format!("v{}", env!("CARGO_PKG_VERSION")).cyan());
    }

    // Modes are mutually exclusive; first match wins.
    if opts.geoip {
        let record = geoip::lookup(&opts.target).await?;
        println!("{}", record.render(opts.json)?);
        return Ok(());
    }

    if !opts.phone.is_empty() {
        let record = Libphonenumber.parse(&opts.phone)?;
        println!("{}", record.render(opts.json)?);
        return Ok(());
    }

    if opts.portscan {
        let scanner = Scanner::new(&opts.target, opts.scanstart, opts.scanend)?;

        let worst_case = scanner.worst_case();
        if !opts.json && worst_case > SLOW_SCAN {
            eprintln!(
                "{}",
                format!(
                    "Ports are scanned one at a time; this range can take up to {}s.",
                    worst_case.as_secs()
                )
                .yellow()
            );
        }

        let result = scanner.run().await;
        println!("{}", result.render(opts.json)?);
        return Ok(());
    }

    if opts.proto == Protocol::Https && !opts.json {
        eprintln!(
            "{}",
            "HTTPS probes skip certificate validation by design; UP means reachable, not trusted."
                .yellow()
        );
    }

    monitor::run(&opts).await
}
