//! GeoIP and ASN enrichment through the ip-api.com HTTP API.
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::address::resolve_host;

const GEOIP_ENDPOINT: &str = "http://ip-api.com/json";
const GEOIP_FIELDS: &str = "status,message,country,regionName,city,lat,lon,org,as,reverse";
const GEOIP_TIMEOUT: Duration = Duration::from_secs(5);

/// Geolocation and ASN metadata for one address. Produced once per
/// invocation, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct GeoRecord {
    /// City the address is registered in.
    pub city: String,
    /// Region or state name.
    pub region: String,
    /// Country name.
    pub country: String,
    /// Autonomous system, e.g. "AS15169 Google LLC".
    #[serde(rename = "as")]
    pub asn: String,
    /// Organization owning the address.
    pub org: String,
    /// Reverse DNS hostname of the address, as seen by the provider.
    #[serde(rename = "reverse")]
    pub reverse_hostname: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Wire format of the provider response. Every data field is optional on
/// failure responses, hence the defaults.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    country: String,
    #[serde(default, rename = "regionName")]
    region_name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    #[serde(default)]
    org: String,
    #[serde(default, rename = "as")]
    asn: String,
    #[serde(default)]
    reverse: String,
}

/// Looks up GeoIP/ASN metadata for `target`.
///
/// Hostnames are resolved to an IP first; when resolution fails the literal
/// string is handed to the provider as-is and the provider gets to reject
/// it. A provider-side failure (status other than "success") surfaces as an
/// error carrying the provider's message. There are no retries.
pub async fn lookup(target: &str) -> Result<GeoRecord> {
    let ip = resolve_host(target)
        .await
        .map_or_else(|| target.to_owned(), |ip| ip.to_string());
    debug!("GeoIP lookup for {target} using address {ip}");

    let client = reqwest::Client::builder().timeout(GEOIP_TIMEOUT).build()?;
    let url = format!("{GEOIP_ENDPOINT}/{ip}?fields={GEOIP_FIELDS}");

    let response = client
        .get(&url)
        .send()
        .await
        .context("GeoIP request failed")?;
    let body: ApiResponse = response
        .json()
        .await
        .context("GeoIP response was not valid JSON")?;

    into_record(body)
}

fn into_record(body: ApiResponse) -> Result<GeoRecord> {
    if body.status != "success" {
        bail!("lookup failed: {}", body.message);
    }

    Ok(GeoRecord {
        city: body.city,
        region: body.region_name,
        country: body.country,
        asn: body.asn,
        org: body.org,
        reverse_hostname: body.reverse,
        lat: body.lat,
        lon: body.lon,
    })
}
