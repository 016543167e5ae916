//! Signature oracle boundary
//!
//! The ledger core treats signature checking as an opaque question: given an
//! owner's public key bytes, a message, and signature bytes, is the signature
//! good? [`SignatureVerifier`] is that seam; [`Secp256k1Verifier`] is the
//! production answer, ECDSA over secp256k1 with a SHA-256 message digest.
//! Signature *generation* stays outside the crate.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};
use sha2::{Digest, Sha256};

/// Opaque signature oracle consumed by transaction validation.
pub trait SignatureVerifier {
    /// True iff `signature` is a valid signature by `owner` over `message`.
    /// Malformed keys or signatures are routine input and verify false.
    fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

/// ECDSA/secp256k1 verifier. Accepts DER signatures, falling back to the
/// 64-byte compact form; owner bytes are a SEC1-encoded public key.
pub struct Secp256k1Verifier {
    ctx: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            ctx: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let key = match PublicKey::from_slice(owner) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match Signature::from_der(signature)
            .or_else(|_| Signature::from_compact(signature))
        {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let digest = Sha256::digest(message);
        let message = match Message::from_digest_slice(&digest) {
            Ok(message) => message,
            Err(_) => return false,
        };
        self.ctx.verify_ecdsa(&message, &signature, &key).is_ok()
    }
}
