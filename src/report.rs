//! Text and JSON rendering with a shared field contract.
//!
//! Every result type renders through [`Report`]. JSON output comes straight
//! from the type's `Serialize` impl; text output is driven by the same field
//! list, so the two modes always show exactly the same set of fields. That
//! symmetry is load-bearing and covered by tests.
use anyhow::Result;
use serde::Serialize;

use crate::geoip::GeoRecord;
use crate::phone::PhoneRecord;
use crate::probe::CheckResult;
use crate::scan::ScanResult;

/// Rendering contract shared by every result kind.
pub trait Report: Serialize {
    /// One-line heading for the text summary.
    fn title(&self) -> String;

    /// Field name/value pairs in output order. Names match the JSON keys;
    /// optional fields appear only when they carry a value, mirroring
    /// `skip_serializing_if` on the struct.
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Renders as a human-readable summary or as pretty-printed JSON.
    fn render(&self, as_json: bool) -> Result<String> {
        if as_json {
            return Ok(serde_json::to_string_pretty(self)?);
        }

        let mut out = self.title();
        for (name, value) in self.fields() {
            out.push_str(&format!("\n  {name:<12} {value}"));
        }
        Ok(out)
    }
}

impl Report for CheckResult {
    fn title(&self) -> String {
        format!("Check of {} over {}", self.target, self.proto)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("target", self.target.clone()),
            ("proto", self.proto.to_string()),
            ("time", self.time.to_rfc3339()),
            ("up", self.up.to_string()),
        ];
        if let Some(latency) = self.latency_ms {
            fields.push(("latency_ms", latency.to_string()));
        }
        if let Some(status) = self.status {
            fields.push(("status", status.to_string()));
        }
        if let Some(downtime) = &self.downtime {
            fields.push(("downtime", downtime.clone()));
        }
        fields
    }
}

impl Report for ScanResult {
    fn title(&self) -> String {
        format!("Port scan of {}", self.host)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let ports = if self.open_ports.is_empty() {
            String::from("none")
        } else {
            self.open_ports
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        vec![("host", self.host.clone()), ("open_ports", ports)]
    }
}

impl Report for GeoRecord {
    fn title(&self) -> String {
        String::from("GeoIP/ASN record")
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("city", self.city.clone()),
            ("region", self.region.clone()),
            ("country", self.country.clone()),
            ("as", self.asn.clone()),
            ("org", self.org.clone()),
            ("reverse", self.reverse_hostname.clone()),
            ("lat", self.lat.to_string()),
            ("lon", self.lon.to_string()),
        ]
    }
}

impl Report for PhoneRecord {
    fn title(&self) -> String {
        String::from("Phone number metadata")
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("raw_input", self.raw_input.clone()),
            ("e164", self.e164.clone()),
            ("region", self.region.clone()),
            ("type", self.number_type.clone()),
            ("valid", self.valid.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Report;
    use crate::geoip::GeoRecord;
    use crate::input::Protocol;
    use crate::phone::PhoneRecord;
    use crate::probe::CheckResult;
    use crate::scan::ScanResult;
    use chrono::Utc;
    use std::collections::BTreeSet;

    /// The set of JSON keys must equal the set of text fields.
    fn assert_symmetry<T: Report>(value: &T) {
        let json = serde_json::to_value(value).unwrap();
        let json_keys: BTreeSet<String> = json
            .as_object()
            .expect("reports serialize to objects")
            .keys()
            .cloned()
            .collect();
        let text_fields: BTreeSet<String> = value
            .fields()
            .into_iter()
            .map(|(name, _)| name.to_owned())
            .collect();

        assert_eq!(json_keys, text_fields);
    }

    fn check_result() -> CheckResult {
        CheckResult {
            target: "localhost".to_owned(),
            proto: Protocol::Tcp,
            time: Utc::now(),
            port: 80,
            up: true,
            latency_ms: None,
            status: None,
            downtime: None,
        }
    }

    #[test]
    fn check_result_minimal_symmetry() {
        assert_symmetry(&check_result());
    }

    #[test]
    fn check_result_full_symmetry() {
        let result = CheckResult {
            proto: Protocol::Https,
            latency_ms: Some(12),
            status: Some(200),
            downtime: Some("3s".to_owned()),
            ..check_result()
        };
        assert_symmetry(&result);
    }

    #[test]
    fn scan_result_symmetry() {
        assert_symmetry(&ScanResult {
            host: "localhost".to_owned(),
            open_ports: vec![22, 80, 443],
        });
        assert_symmetry(&ScanResult {
            host: "localhost".to_owned(),
            open_ports: vec![],
        });
    }

    #[test]
    fn geo_record_symmetry() {
        assert_symmetry(&GeoRecord {
            city: "Berlin".to_owned(),
            region: "Berlin".to_owned(),
            country: "Germany".to_owned(),
            asn: "AS3320".to_owned(),
            org: "Example".to_owned(),
            reverse_hostname: "host.example.net".to_owned(),
            lat: 52.52,
            lon: 13.405,
        });
    }

    #[test]
    fn phone_record_symmetry() {
        assert_symmetry(&PhoneRecord {
            raw_input: "+44 20 7183 8750".to_owned(),
            e164: "+442071838750".to_owned(),
            region: "GB".to_owned(),
            number_type: "Fixed line".to_owned(),
            valid: true,
        });
    }

    #[test]
    fn check_result_json_uses_stable_keys() {
        let result = CheckResult {
            latency_ms: Some(3),
            ..check_result()
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["target"], "localhost");
        assert_eq!(json["proto"], "tcp");
        assert_eq!(json["up"], true);
        assert_eq!(json["latency_ms"], 3);
        assert!(json.get("port").is_none());
        assert!(json.get("status").is_none());
        assert!(json["time"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn geo_record_json_uses_provider_key_names() {
        let record = GeoRecord {
            city: String::new(),
            region: String::new(),
            country: String::new(),
            asn: "AS15169".to_owned(),
            org: String::new(),
            reverse_hostname: "dns.google".to_owned(),
            lat: 0.0,
            lon: 0.0,
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["as"], "AS15169");
        assert_eq!(json["reverse"], "dns.google");
    }

    #[test]
    fn text_mode_prints_every_field() {
        let result = CheckResult {
            latency_ms: Some(7),
            status: Some(301),
            ..check_result()
        };
        let text = result.render(false).unwrap();

        assert!(text.contains("target"));
        assert!(text.contains("latency_ms"));
        assert!(text.contains("301"));
    }
}
