use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rampart_system_analytics::ProgressRecord;

const SAVE_DOMAIN: &str = "rampart";
const SAVE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded progress payload.
pub(crate) const SAVE_HEADER: &str = "rampart:v1";
/// Delimiter separating the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes `record` into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(record: &ProgressRecord) -> Result<String, SaveCodeError> {
    let json = serde_json::to_vec(record).map_err(SaveCodeError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SAVE_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a progress record from its save-code representation.
pub(crate) fn decode(value: &str) -> Result<ProgressRecord, SaveCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveCodeError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveCodeError::MissingPrefix)?;
    let version = parts.next().ok_or(SaveCodeError::MissingVersion)?;
    let payload = parts.next().ok_or(SaveCodeError::MissingPayload)?;

    if domain != SAVE_DOMAIN {
        return Err(SaveCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != SAVE_VERSION {
        return Err(SaveCodeError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SaveCodeError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(SaveCodeError::InvalidPayload)
}

/// Errors that can occur while encoding or decoding save codes.
#[derive(Debug)]
pub(crate) enum SaveCodeError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The payload segment was missing.
    MissingPayload,
    /// The save code used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The save code used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for SaveCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "save code was empty"),
            Self::MissingPrefix => write!(f, "save code is missing the prefix"),
            Self::MissingVersion => write!(f, "save code is missing the version"),
            Self::MissingPayload => write!(f, "save code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "save prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "save version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => write!(f, "could not decode save payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not parse save payload: {error}"),
        }
    }
}

impl Error for SaveCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::TowerId;

    #[test]
    fn round_trip_fresh_record() {
        let record = ProgressRecord::new("meadow");

        let encoded = encode(&record).expect("record encodes");
        assert!(encoded.starts_with(&format!("{SAVE_HEADER}:")));

        let decoded = decode(&encoded).expect("save code decodes");
        assert_eq!(record, decoded);
    }

    #[test]
    fn round_trip_played_record() {
        let mut record = ProgressRecord::new("meadow");
        record.best_wave = 4;
        record.stars = 2;
        record.statistics.record_kill(Some(TowerId::new(3)));
        record.statistics.record_damage(Some(TowerId::new(3)), 75.0);

        let encoded = encode(&record).expect("record encodes");
        let decoded = decode(&format!("  {encoded}\n")).expect("save code decodes");

        assert_eq!(record, decoded);
    }

    #[test]
    fn foreign_prefixes_and_versions_are_rejected() {
        assert!(matches!(decode(""), Err(SaveCodeError::EmptyPayload)));
        assert!(matches!(
            decode("fortress:v1:e30"),
            Err(SaveCodeError::InvalidPrefix(prefix)) if prefix == "fortress"
        ));
        assert!(matches!(
            decode("rampart:v2:e30"),
            Err(SaveCodeError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode("rampart:v1"),
            Err(SaveCodeError::MissingPayload)
        ));
        assert!(matches!(
            decode("rampart:v1:!!!"),
            Err(SaveCodeError::InvalidEncoding(_))
        ));
    }
}
