//! Envelope decoding for the message-queue trigger.
//!
//! The transport delivers an envelope `{"data": "<base64>"}` whose payload
//! decodes to UTF-8 JSON in one of two shapes:
//!
//! - rich: `{"incident": {"resource_name": ...}, "logEntry": {...}}`
//! - plain: `{"key_name": ...}`
//!
//! Decoding is a pure function: no I/O, no side effects. Either a fully
//! populated [`IncidentEvent`] comes out, or a [`DecodeError`] does.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::IncidentEvent;

/// Required namespace prefix for a key resource name.
const KEY_NAME_PREFIX: &str = "projects/";

/// Service prefix carried by resource names in audit-log alerts.
const IAM_SERVICE_PREFIX: &str = "//iam.googleapis.com/";

/// Why an envelope failed to decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid envelope: {0}")]
    Envelope(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("payload names no key: expected 'key_name' or 'incident.resource_name'")]
    MissingKeyName,

    #[error("invalid key name '{0}': key must start with 'projects/'")]
    InvalidKeyName(String),
}

/// Transport envelope as delivered by the trigger.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: String,
}

/// Rich alert payload: incident metadata plus the raw audit-log entry.
#[derive(Debug, Deserialize)]
struct AlertPayload {
    incident: Incident,
    #[serde(rename = "logEntry")]
    log_entry: Value,
}

#[derive(Debug, Deserialize)]
struct Incident {
    resource_name: String,
}

/// Plain payload: just the key to revoke.
#[derive(Debug, Deserialize)]
struct PlainPayload {
    key_name: String,
}

/// Decode a raw transport envelope into an [`IncidentEvent`].
///
/// For the plain payload shape there is no separate log entry, so the
/// whole payload document is preserved as the raw log.
pub fn decode_envelope(raw: &[u8]) -> Result<IncidentEvent, DecodeError> {
    let envelope: Envelope =
        serde_json::from_slice(raw).map_err(|e| DecodeError::Envelope(e.to_string()))?;

    let bytes = BASE64.decode(envelope.data.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    let payload: Value = serde_json::from_str(&text)?;

    let (key_name, raw_log) =
        if let Ok(alert) = serde_json::from_value::<AlertPayload>(payload.clone()) {
            (alert.incident.resource_name, alert.log_entry)
        } else if let Ok(plain) = serde_json::from_value::<PlainPayload>(payload.clone()) {
            (plain.key_name, payload)
        } else {
            return Err(DecodeError::MissingKeyName);
        };

    let key_name = normalize_key_name(&key_name);
    if !key_name.starts_with(KEY_NAME_PREFIX) {
        return Err(DecodeError::InvalidKeyName(key_name));
    }

    Ok(IncidentEvent::new(key_name, raw_log))
}

/// Strip the IAM service prefix that audit-log resource names carry, so
/// both payload shapes validate against the same `projects/` grammar.
fn normalize_key_name(name: &str) -> String {
    name.strip_prefix(IAM_SERVICE_PREFIX).unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(payload: &Value) -> Vec<u8> {
        let data = BASE64.encode(payload.to_string());
        json!({ "data": data }).to_string().into_bytes()
    }

    #[test]
    fn test_decode_plain_payload() {
        let raw = envelope(&json!({
            "key_name": "projects/p/serviceAccounts/sa/keys/k1"
        }));

        let event = decode_envelope(&raw).unwrap();
        assert_eq!(event.key_name, "projects/p/serviceAccounts/sa/keys/k1");
        // Plain shape keeps the whole payload as the raw log
        assert_eq!(event.raw_log["key_name"], "projects/p/serviceAccounts/sa/keys/k1");
    }

    #[test]
    fn test_decode_rich_payload() {
        let raw = envelope(&json!({
            "incident": {
                "incident_id": "i-5678abcd",
                "resource_name": "//iam.googleapis.com/projects/p/serviceAccounts/sa/keys/k1",
                "summary": "Suspicious Service Account Key creation detected."
            },
            "logEntry": {
                "severity": "ERROR",
                "protoPayload": { "methodName": "google.iam.admin.v1.CreateServiceAccountKey" }
            }
        }));

        let event = decode_envelope(&raw).unwrap();
        assert_eq!(event.key_name, "projects/p/serviceAccounts/sa/keys/k1");
        assert_eq!(event.raw_log["severity"], "ERROR");
    }

    #[test]
    fn test_decode_rejects_bad_outer_json() {
        let err = decode_envelope(b"not an envelope").unwrap_err();
        assert!(matches!(err, DecodeError::Envelope(_)));
    }

    #[test]
    fn test_decode_rejects_missing_data_field() {
        let err = decode_envelope(br#"{"payload": "x"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Envelope(_)));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let raw = json!({ "data": "!!! not base64 !!!" }).to_string();
        let err = decode_envelope(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_decode_rejects_non_json_payload() {
        let raw = json!({ "data": BASE64.encode("not json") }).to_string();
        let err = decode_envelope(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Payload(_)));
    }

    #[test]
    fn test_decode_rejects_payload_without_key() {
        let raw = envelope(&json!({ "something": "else" }));
        let err = decode_envelope(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKeyName));
    }

    #[test]
    fn test_decode_rejects_wrong_namespace() {
        let raw = envelope(&json!({ "key_name": "folders/f/keys/k1" }));
        let err = decode_envelope(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidKeyName(_)));
        assert!(err.to_string().contains("projects/"));
    }

    #[test]
    fn test_normalize_strips_service_prefix() {
        assert_eq!(
            normalize_key_name("//iam.googleapis.com/projects/p/keys/k"),
            "projects/p/keys/k"
        );
        assert_eq!(normalize_key_name("projects/p/keys/k"), "projects/p/keys/k");
    }
}
