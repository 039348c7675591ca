//! Hostname resolution shared by the DNS probe and the GeoIP adapter.

use std::net::IpAddr;
use std::str::FromStr;

use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};
use log::debug;

/// Resolves a host to its first IP address.
///
/// IP literals pass through untouched. Hostnames go through the operating
/// system resolver first; when that fails, a fallback resolver takes over
/// (system configuration where available, Cloudflare otherwise).
///
/// Returns `None` when the name does not resolve to any address.
pub async fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = IpAddr::from_str(host) {
        return Some(ip);
    }

    if let Ok(mut addrs) = tokio::net::lookup_host((host, 80)).await {
        if let Some(addr) = addrs.next() {
            return Some(addr.ip());
        }
    }

    match fallback_resolver().lookup_ip(host).await {
        Ok(lookup) => lookup.iter().next(),
        Err(e) => {
            debug!("Fallback resolution for {host} failed: {e}");
            None
        }
    }
}

/// Derive a DNS resolver for hosts the system resolver cannot answer:
/// the system config where readable (e.g. `/etc/resolv.conf` on *nix),
/// a Cloudflare-based resolver otherwise.
fn fallback_resolver() -> TokioAsyncResolver {
    TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
        TokioAsyncResolver::tokio(ResolverConfig::cloudflare_tls(), ResolverOpts::default())
    })
}
