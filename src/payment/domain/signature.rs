//! Gateway checkout signatures.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Verifies HMAC-SHA256 signatures over `order_id|payment_id`.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SignatureVerifier {
    /// Creates a verifier keyed by the gateway's shared secret.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Some(mac)
    }

    /// Returns the lower-case hex signature for a checkout.
    #[must_use]
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        self.mac(order_id, payment_id)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    /// Checks `signature` in constant time. Malformed hex never verifies.
    #[must_use]
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Some(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        self.mac(order_id, payment_id)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    }
}

mod hex {
    /// Encodes bytes as lower-case hex.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decodes hex, either case; `None` on odd length or bad digits.
    pub fn decode(text: &str) -> Option<Vec<u8>> {
        let pairs = text.as_bytes().chunks_exact(2);
        if !pairs.remainder().is_empty() {
            return None;
        }
        pairs
            .map(|pair| match pair {
                [high, low] => Some((nibble(*high)? << 4) | nibble(*low)?),
                _ => None,
            })
            .collect()
    }

    const fn nibble(digit: u8) -> Option<u8> {
        match digit {
            b'0'..=b'9' => Some(digit - b'0'),
            b'a'..=b'f' => Some(digit - b'a' + 10),
            b'A'..=b'F' => Some(digit - b'A' + 10),
            _ => None,
        }
    }
}
