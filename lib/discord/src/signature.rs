//! Ed25519 verification of interaction requests.
//!
//! Discord signs every interaction delivery with the application's key pair
//! and requires endpoints to reject requests whose signature does not cover
//! `timestamp || body`. Requests failing verification must be answered with
//! 401 or Discord disables the endpoint.

use ring::signature::{ED25519, UnparsedPublicKey};
use std::fmt;

/// Errors from interaction-signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The configured public key is not valid hex of the right length.
    InvalidPublicKey { details: String },
    /// The signature header is not valid hex.
    MalformedSignature,
    /// The signature does not cover this timestamp and body.
    VerificationFailed,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPublicKey { details } => {
                write!(f, "invalid interaction public key: {details}")
            }
            Self::MalformedSignature => write!(f, "malformed interaction signature"),
            Self::VerificationFailed => write!(f, "interaction signature verification failed"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// Verifies interaction signatures against the application public key.
pub struct InteractionVerifier {
    public_key: Vec<u8>,
}

impl InteractionVerifier {
    /// Creates a verifier from the hex-encoded application public key shown
    /// in the Discord developer portal.
    pub fn new(public_key_hex: &str) -> Result<Self, SignatureError> {
        let public_key =
            hex::decode(public_key_hex).map_err(|e| SignatureError::InvalidPublicKey {
                details: e.to_string(),
            })?;
        if public_key.len() != 32 {
            return Err(SignatureError::InvalidPublicKey {
                details: format!("expected 32 bytes, got {}", public_key.len()),
            });
        }
        Ok(Self { public_key })
    }

    /// Checks that `signature_hex` covers `timestamp` concatenated with the
    /// raw request body.
    pub fn verify(
        &self,
        signature_hex: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let signature =
            hex::decode(signature_hex).map_err(|_| SignatureError::MalformedSignature)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        UnparsedPublicKey::new(&ED25519, &self.public_key)
            .verify(&message, &signature)
            .map_err(|_| SignatureError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::rand::SystemRandom;
    use ring::signature::{Ed25519KeyPair, KeyPair};

    fn test_keypair() -> (Ed25519KeyPair, String) {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).expect("generate key");
        let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).expect("parse key");
        let public_key_hex = hex::encode(key_pair.public_key().as_ref());
        (key_pair, public_key_hex)
    }

    fn sign(key_pair: &Ed25519KeyPair, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(key_pair.sign(&message).as_ref())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let (key_pair, public_key_hex) = test_keypair();
        let verifier = InteractionVerifier::new(&public_key_hex).unwrap();

        let body = br#"{"type":1}"#;
        let signature = sign(&key_pair, "1700000000", body);

        assert!(verifier.verify(&signature, "1700000000", body).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let (key_pair, public_key_hex) = test_keypair();
        let verifier = InteractionVerifier::new(&public_key_hex).unwrap();

        let signature = sign(&key_pair, "1700000000", br#"{"type":1}"#);
        let result = verifier.verify(&signature, "1700000000", br#"{"type":3}"#);

        assert_eq!(result, Err(SignatureError::VerificationFailed));
    }

    #[test]
    fn mismatched_timestamp_is_rejected() {
        let (key_pair, public_key_hex) = test_keypair();
        let verifier = InteractionVerifier::new(&public_key_hex).unwrap();

        let body = br#"{"type":1}"#;
        let signature = sign(&key_pair, "1700000000", body);

        assert_eq!(
            verifier.verify(&signature, "1700000001", body),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn non_hex_signature_is_malformed() {
        let (_, public_key_hex) = test_keypair();
        let verifier = InteractionVerifier::new(&public_key_hex).unwrap();

        assert_eq!(
            verifier.verify("not-hex", "1700000000", b"{}"),
            Err(SignatureError::MalformedSignature)
        );
    }

    #[test]
    fn wrong_length_public_key_is_rejected() {
        let result = InteractionVerifier::new("abcd");
        assert!(matches!(
            result,
            Err(SignatureError::InvalidPublicKey { .. })
        ));
    }

    #[test]
    fn non_hex_public_key_is_rejected() {
        let result = InteractionVerifier::new("zz".repeat(32).as_str());
        assert!(matches!(
            result,
            Err(SignatureError::InvalidPublicKey { .. })
        ));
    }
}
