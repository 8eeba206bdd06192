//! Webhook signature gate: HMAC-SHA256 over the raw request body, keyed by the
//! channel secret, base64 encoded (the `X-Line-Signature` header value).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing X-Line-Signature header")]
    Missing,
    #[error("malformed signature")]
    Malformed,
    #[error("signature mismatch")]
    Mismatch,
}

fn mac_for(body: &[u8], secret: &str) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    mac
}

/// Compute the base64 signature the platform would send for `body`.
pub fn sign(body: &[u8], secret: &str) -> String {
    BASE64.encode(mac_for(body, secret).finalize().into_bytes())
}

/// Check `signature` (header value) against `body`. Constant-time comparison.
pub fn check(body: &[u8], signature: Option<&str>, secret: &str) -> Result<(), SignatureError> {
    let signature = signature.ok_or(SignatureError::Missing)?;
    let provided = BASE64
        .decode(signature.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac_for(body, secret)
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

/// True only when `signature` is exactly the signature of `body` under `secret`.
pub fn verify(body: &[u8], signature: &str, secret: &str) -> bool {
    check(body, Some(signature), secret).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "channel-secret";

    #[test]
    fn sign_then_verify() {
        let bodies: [&[u8]; 4] = [
            b"",
            b"{}",
            br#"{"events":[]}"#,
            "日本語のテキスト".as_bytes(),
        ];
        for body in bodies {
            let sig = sign(body, SECRET);
            assert!(verify(body, &sig, SECRET), "body {:?}", body);
        }
    }

    #[test]
    fn known_vector() {
        let sig = sign(b"hello", "key");
        assert_eq!(sig, "kwezuRXvtRcf8U2MtV+8x5jGwO8UVtZt7RpqpyOli3s=");
    }

    #[test]
    fn rejects_wrong_secret_and_tampered_body() {
        let body = br#"{"events":[{"type":"message"}]}"#;
        let sig = sign(body, SECRET);
        assert!(!verify(body, &sig, "other-secret"));
        assert!(!verify(br#"{"events":[{"type":"message" }]}"#, &sig, SECRET));
    }

    #[test]
    fn check_reports_error_kind() {
        let body = b"payload";
        assert_eq!(check(body, None, SECRET), Err(SignatureError::Missing));
        assert_eq!(check(body, Some("not base64!!"), SECRET), Err(SignatureError::Malformed));
        assert_eq!(check(body, Some("AAAA"), SECRET), Err(SignatureError::Mismatch));
        assert_eq!(check(body, Some(""), SECRET), Err(SignatureError::Mismatch));
        let sig = sign(body, SECRET);
        assert_eq!(check(body, Some(&sig), SECRET), Ok(()));
    }

    #[test]
    fn rejects_truncated_and_altered_signature() {
        let body = b"payload";
        let sig = sign(body, SECRET);
        assert!(!verify(body, &sig[..sig.len() - 4], SECRET));
        let mut altered = sig.clone().into_bytes();
        altered[0] = if altered[0] == b'A' { b'B' } else { b'A' };
        assert!(!verify(body, std::str::from_utf8(&altered).unwrap(), SECRET));
        for padded in [
            format!(" {}", sig),
            format!("{} ", sig),
            format!("{}\n", sig),
            format!("\t{}", sig),
        ] {
            assert!(!verify(body, &padded, SECRET), "accepted {:?}", padded);
            assert_eq!(check(body, Some(&padded), SECRET), Err(SignatureError::Malformed));
        }
    }
}
