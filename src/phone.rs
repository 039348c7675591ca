//! Phone-number metadata lookup behind an injectable parser capability.
//!
//! The adapter has no parsing logic of its own: validity, region inference,
//! type classification and E.164 formatting are all delegated to the backing
//! library. The [`PhoneProvider`] trait keeps that library swappable so the
//! dispatcher and the rendering path can be tested with a fake.
use anyhow::{anyhow, Result};
use phonenumber::Mode;
use serde_derive::Serialize;

/// Parsed metadata for one phone number.
#[derive(Debug, Clone, Serialize)]
pub struct PhoneRecord {
    /// The string exactly as the user passed it.
    pub raw_input: String,
    /// E.164 rendering, e.g. "+442071838750".
    pub e164: String,
    /// ISO region code inferred from the number, e.g. "GB".
    pub region: String,
    /// Human-readable line type, e.g. "Mobile" or "Fixed line".
    #[serde(rename = "type")]
    pub number_type: String,
    /// Whether the number is valid for its region.
    pub valid: bool,
}

/// Narrow interface over whichever phone-number library backs the lookup.
pub trait PhoneProvider {
    /// Parses and classifies `input`, or fails with a user-facing message.
    fn parse(&self, input: &str) -> Result<PhoneRecord>;
}

/// The real provider, delegating entirely to the `phonenumber` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Libphonenumber;

impl PhoneProvider for Libphonenumber {
    fn parse(&self, input: &str) -> Result<PhoneRecord> {
        let number = phonenumber::parse(None, input)
            .map_err(|e| anyhow!("Invalid phone number {input:?}: {e}"))?;

        let region = number
            .country()
            .id()
            .map_or_else(String::new, |id| format!("{id:?}"));

        let kind = number.number_type(&phonenumber::metadata::DATABASE);

        Ok(PhoneRecord {
            raw_input: input.to_owned(),
            e164: number.format().mode(Mode::E164).to_string(),
            region,
            number_type: type_name(kind).to_owned(),
            valid: phonenumber::is_valid(&number),
        })
    }
}

fn type_name(kind: phonenumber::Type) -> &'static str {
    use phonenumber::Type;

    match kind {
        Type::FixedLine => "Fixed line",
        Type::Mobile => "Mobile",
        Type::FixedLineOrMobile => "Fixed line or mobile",
        Type::TollFree => "Toll free",
        Type::PremiumRate => "Premium rate",
        Type::SharedCost => "Shared cost",
        Type::Voip => "VOIP",
        Type::PersonalNumber => "Personal number",
        Type::Pager => "Pager",
        Type::Uan => "UAN",
        Type::Voicemail => "Voicemail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::{Libphonenumber, PhoneProvider, PhoneRecord};
    use anyhow::{bail, Result};

    /// A canned provider, standing in for the real library.
    struct FakeProvider {
        record: Option<PhoneRecord>,
    }

    impl PhoneProvider for FakeProvider {
        fn parse(&self, input: &str) -> Result<PhoneRecord> {
            match &self.record {
                Some(record) => Ok(PhoneRecord {
                    raw_input: input.to_owned(),
                    ..record.clone()
                }),
                None => bail!("Invalid phone number {input:?}"),
            }
        }
    }

    fn canned_record() -> PhoneRecord {
        PhoneRecord {
            raw_input: String::new(),
            e164: "+442071838750".to_owned(),
            region: "GB".to_owned(),
            number_type: "Fixed line".to_owned(),
            valid: true,
        }
    }

    #[test]
    fn fake_provider_feeds_the_adapter_contract() {
        let provider = FakeProvider {
            record: Some(canned_record()),
        };

        let record = provider.parse("+44 20 7183 8750").unwrap();
        assert_eq!(record.raw_input, "+44 20 7183 8750");
        assert_eq!(record.e164, "+442071838750");
        assert!(record.valid);
    }

    #[test]
    fn fake_provider_surfaces_parse_errors() {
        let provider = FakeProvider { record: None };
        assert!(provider.parse("nonsense").is_err());
    }

    #[test]
    fn real_provider_parses_an_international_number() {
        let record = Libphonenumber.parse("+44 20 7183 8750").unwrap();

        assert_eq!(record.raw_input, "+44 20 7183 8750");
        assert_eq!(record.e164, "+442071838750");
        assert_eq!(record.region, "GB");
        assert!(record.valid);
        assert!(!record.number_type.is_empty());
    }

    #[test]
    fn real_provider_rejects_garbage() {
        assert!(Libphonenumber.parse("hello").is_err());
    }
}
