// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed admin session tokens and constant-time secret comparison.
//!
//! A token is `issuedAtMs.nonceHex.signatureHex` where the signature is
//! HMAC-SHA256 over `issuedAtMs.nonceHex`. Tokens are stateless: nothing is
//! stored server-side, so logout only clears the cookie.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Key used only to bring both sides of a comparison to equal-length digests.
const COMPARE_KEY: &[u8] = b"revline-secret-compare";

const NONCE_LEN: usize = 16;

/// Compares a caller-supplied secret against the configured one in constant time.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(COMPARE_KEY) else {
        return false;
    };
    mac.update(expected.as_bytes());
    let expected_tag = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(COMPARE_KEY) else {
        return false;
    };
    mac.update(provided.as_bytes());
    mac.verify_slice(&expected_tag).is_ok()
}

/// Issues and verifies admin session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
    ttl_ms: i64,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("key", &"[redacted]")
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}

impl SessionSigner {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            ttl_ms: i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
        }
    }

    /// Session lifetime in seconds, used for the cookie `Max-Age`.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_ms / 1000
    }

    fn mac(&self, payload: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(payload.as_bytes());
        Some(mac)
    }

    /// Creates a token issued at `now_ms`.
    pub fn issue(&self, now_ms: i64) -> Option<String> {
        let nonce: [u8; NONCE_LEN] = rand::random();
        let payload = format!("{now_ms}.{}", hex::encode(nonce));
        let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());
        Some(format!("{payload}.{signature}"))
    }

    /// Checks shape, age and signature of a token.
    pub fn verify(&self, token: &str, now_ms: i64) -> bool {
        let mut parts = token.split('.');
        let (Some(issued), Some(nonce), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        let Ok(issued_ms) = issued.parse::<i64>() else {
            return false;
        };
        if now_ms.saturating_sub(issued_ms) > self.ttl_ms {
            return false;
        }
        if nonce.len() != NONCE_LEN * 2 || !nonce.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };

        self.mac(&format!("{issued}.{nonce}"))
            .is_some_and(|mac| mac.verify_slice(&signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const TWELVE_HOURS_SECS: u64 = 12 * 60 * 60;
    const NOW: i64 = 1_760_000_000_000;

    fn signer() -> SessionSigner {
        SessionSigner::new(SECRET, TWELVE_HOURS_SECS)
    }

    #[test]
    fn fresh_token_verifies() {
        let token = signer().issue(NOW).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(signer().verify(&token, NOW));
        assert!(signer().verify(&token, NOW + 60_000));
    }

    #[test]
    fn tokens_are_unique() {
        let s = signer();
        assert_ne!(s.issue(NOW).unwrap(), s.issue(NOW).unwrap());
    }

    #[test]
    fn token_expires_after_ttl() {
        let token = signer().issue(NOW).unwrap();
        let ttl_ms = 12 * 60 * 60 * 1000;
        assert!(signer().verify(&token, NOW + ttl_ms));
        assert!(!signer().verify(&token, NOW + ttl_ms + 1));
    }

    #[test]
    fn tampered_timestamp_is_rejected() {
        let token = signer().issue(NOW).unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", NOW + 1);
        assert!(!signer().verify(&forged, NOW + 1));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = signer().issue(NOW).unwrap();
        let mut forged = token.clone();
        let last = forged.pop().unwrap();
        forged.push(if last == '0' { '1' } else { '0' });
        assert!(!signer().verify(&forged, NOW));
    }

    #[test]
    fn other_key_is_rejected() {
        let token = signer().issue(NOW).unwrap();
        let other = SessionSigner::new("ffffffffffffffffffffffffffffffff", TWELVE_HOURS_SECS);
        assert!(!other.verify(&token, NOW));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let s = signer();
        for token in ["", "abc", "1.2", "x.00.00", "1.zz.00", "1.2.3.4"] {
            assert!(!s.verify(token, NOW), "{token:?} should not verify");
        }
    }

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("cron-secret", "cron-secret"));
        assert!(!secrets_match("cron-secre", "cron-secret"));
        assert!(!secrets_match("", "cron-secret"));
        assert!(!secrets_match("cron-secret-and-more", "cron-secret"));
    }

    #[test]
    fn debug_redacts_key() {
        assert!(!format!("{:?}", signer()).contains(SECRET));
    }
}
