//! Signing collaborator.
//!
//! The client never implements signature algorithms itself; it hands the
//! canonical payload bytes to a [`Signer`] bound to the session user.

use std::fmt;
use std::fs;
use std::path::Path;

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;

use crate::error::{IdentityError, IdentityResult};

/// Produces signatures on behalf of one user.
pub trait Signer: Send + Sync {
    /// Identity the signatures are made for.
    fn user_id(&self) -> &str;

    /// Sign `payload`.
    fn sign(&self, payload: &[u8]) -> Vec<u8>;
}

/// Ed25519 signing identity.
pub struct Ed25519Signer {
    user_id: String,
    key: SigningKey,
}

impl Ed25519Signer {
    /// Build a signer from a 32-byte secret key.
    pub fn from_bytes(user_id: impl Into<String>, secret: &[u8; 32]) -> Self {
        Self {
            user_id: user_id.into(),
            key: SigningKey::from_bytes(secret),
        }
    }

    /// Generate a fresh random identity.
    pub fn generate(user_id: impl Into<String>) -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_bytes(user_id, &secret)
    }

    /// Load a raw 32-byte secret key from `path`.
    pub fn from_key_file(user_id: impl Into<String>, path: impl AsRef<Path>) -> IdentityResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| IdentityError::key_file(path, e))?;
        let secret: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdentityError::InvalidKeyLength { len: bytes.len() })?;
        Ok(Self::from_bytes(user_id, &secret))
    }

    /// Public key bytes, registered with the server as the user's certificate.
    pub fn public_key(&self) -> Vec<u8> {
        self.key.verifying_key().to_bytes().to_vec()
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl Signer for Ed25519Signer {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.key.sign(payload).to_bytes().to_vec()
    }
}

/// Verify an Ed25519 `signature` over `payload` made by `public_key`.
pub fn verify_signature(public_key: &[u8], payload: &[u8], signature: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(payload, &signature).is_ok()
}
