//! Stripe wire types: the signature header and the event list envelope.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::webhook::WebhookEvent;

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    #[error("Missing Stripe-Signature header")]
    MissingHeader,
    #[error("Missing timestamp (t=) in signature")]
    MissingTimestamp,
    #[error("Missing v1 signature in header")]
    MissingV1Signature,
    #[error("Invalid timestamp format")]
    InvalidTimestamp,
    #[error("Invalid signature format (not valid hex)")]
    InvalidSignatureFormat,
}

/// Parsed `t=<timestamp>,v1=<signature>[,v1=...]` header.
///
/// Stripe sends several `v1` entries while a signing secret is being
/// rolled; any one of them may match.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the payload.
    pub timestamp: i64,

    /// All v1 signatures (HMAC-SHA256, hex-decoded).
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    v1_signatures.push(
                        hex_decode(value.trim()).ok_or(SignatureParseError::InvalidSignatureFormat)?,
                    );
                }
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Event Listing
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `GET /v1/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventList {
    pub data: Vec<WebhookEvent>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error body returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // SignatureHeader Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_signature_header_valid() {
        let parsed = SignatureHeader::parse("t=1704067200,v1=5d41402abc4b2a76b9719d911017c592").unwrap();

        assert_eq!(parsed.timestamp, 1704067200);
        assert_eq!(parsed.v1_signatures.len(), 1);
        assert_eq!(
            hex_encode(&parsed.v1_signatures[0]),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn parse_signature_header_collects_every_v1() {
        let parsed = SignatureHeader::parse("t=1,v1=aabb,v0=ffff,v1=ccdd").unwrap();
        assert_eq!(parsed.v1_signatures, vec![vec![0xaa, 0xbb], vec![0xcc, 0xdd]]);
    }

    #[test]
    fn parse_signature_header_missing_timestamp() {
        let result = SignatureHeader::parse("v1=5d41402abc4b2a76b9719d911017c592");
        assert_eq!(result.unwrap_err(), SignatureParseError::MissingTimestamp);
    }

    #[test]
    fn parse_signature_header_missing_v1() {
        let result = SignatureHeader::parse("t=1704067200,v0=aabbccdd");
        assert_eq!(result.unwrap_err(), SignatureParseError::MissingV1Signature);
    }

    #[test]
    fn parse_signature_header_empty() {
        assert_eq!(
            SignatureHeader::parse("").unwrap_err(),
            SignatureParseError::MissingHeader
        );
    }

    #[test]
    fn parse_signature_header_invalid_timestamp() {
        let result = SignatureHeader::parse("t=soon,v1=aabb");
        assert_eq!(result.unwrap_err(), SignatureParseError::InvalidTimestamp);
    }

    #[test]
    fn parse_signature_header_odd_length_hex() {
        let result = SignatureHeader::parse("t=1704067200,v1=abc");
        assert_eq!(result.unwrap_err(), SignatureParseError::InvalidSignatureFormat);
    }

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Event List Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn event_list_decodes_page() {
        let body = serde_json::json!({
            "object": "list",
            "url": "/v1/events",
            "has_more": true,
            "data": [{
                "id": "evt_1",
                "object": "event",
                "type": "charge.refunded",
                "created": 1700000000,
                "livemode": false,
                "data": { "object": { "id": "ch_1" } }
            }]
        });

        let list: StripeEventList = serde_json::from_value(body).unwrap();

        assert!(list.has_more);
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].object_id(), Some("ch_1"));
    }
}
