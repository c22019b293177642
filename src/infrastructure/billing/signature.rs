use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Delivery timestamps older or newer than this are rejected to blunt
/// replay of captured payloads
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, PartialEq)]
pub enum SignatureError {
    MalformedSecret,
    MalformedTimestamp,
    TimestampOutOfTolerance,
    NoMatchingSignature,
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedSecret => write!(f, "webhook secret is not valid base64"),
            Self::MalformedTimestamp => write!(f, "webhook timestamp is not a unix epoch"),
            Self::TimestampOutOfTolerance => write!(f, "webhook timestamp outside tolerance"),
            Self::NoMatchingSignature => write!(f, "no signature matched the payload"),
        }
    }
}

/// Verify a billing webhook delivery (Standard Webhooks scheme).
///
/// The signed content is `{msg_id}.{timestamp}.{payload}`; the signature
/// header carries space-separated `v1,<base64>` entries of which one must
/// match the HMAC-SHA256 over that content. Comparison is constant time
/// via the Mac verifier.
pub fn verify_webhook_signature(
    secret: &str,
    msg_id: &str,
    timestamp: &str,
    payload: &[u8],
    signature_header: &str,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MalformedTimestamp)?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let key = decode_secret(secret)?;

    let mut signed_content = Vec::with_capacity(msg_id.len() + timestamp.len() + payload.len() + 2);
    signed_content.extend_from_slice(msg_id.as_bytes());
    signed_content.push(b'.');
    signed_content.extend_from_slice(timestamp.as_bytes());
    signed_content.push(b'.');
    signed_content.extend_from_slice(payload);

    for entry in signature_header.split(' ') {
        let Some(encoded) = entry.strip_prefix("v1,") else {
            continue;
        };
        let Ok(candidate) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|_| SignatureError::MalformedSecret)?;
        mac.update(&signed_content);
        if mac.verify_slice(&candidate).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::NoMatchingSignature)
}

/// Secrets are issued as `whsec_<base64>`; accept the bare form too
fn decode_secret(secret: &str) -> Result<Vec<u8>, SignatureError> {
    let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| SignatureError::MalformedSecret)
}
