//! Reversible obfuscation of stored text.
//!
//! The codec here is AES-128 in ECB mode with PKCS#7 padding, base64 encoded.
//! It keeps payloads unreadable at rest, but it is **not** confidentiality in
//! the cryptographic sense: there is no IV and no authentication, so equal
//! plaintext blocks always encrypt to equal ciphertext blocks and tampering
//! goes unnoticed. The mode is kept so that previously stored rows stay
//! readable.

mod aes_ecb;
mod key;

use thiserror::Error;

pub use aes_ecb::AesEcbCodec;
pub use key::{EnvKey, KeyProvider, LEGACY_KEY, StaticKey};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("cipher error: {0}")]
    Cipher(String),
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    #[error("utf-8 decode error: {0}")]
    Utf8Decode(#[from] std::string::FromUtf8Error),
    #[error("no key found in environment variable {0}")]
    MissingKey(String),
}

/// Text-to-text encryption. Implementations hold no mutable state and can be
/// shared across threads freely.
pub trait Crypto: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;
    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError>;
}

impl<C: Crypto + ?Sized> Crypto for std::sync::Arc<C> {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        (**self).decrypt(ciphertext)
    }
}

/// `"text".encrypted(&codec)` / `ciphertext.decrypted(&codec)`.
pub trait TextCipherExt {
    fn encrypted<C: Crypto + ?Sized>(&self, crypto: &C) -> Result<String, CryptoError>;
    fn decrypted<C: Crypto + ?Sized>(&self, crypto: &C) -> Result<String, CryptoError>;
}

impl TextCipherExt for str {
    fn encrypted<C: Crypto + ?Sized>(&self, crypto: &C) -> Result<String, CryptoError> {
        crypto.encrypt(self)
    }

    fn decrypted<C: Crypto + ?Sized>(&self, crypto: &C) -> Result<String, CryptoError> {
        crypto.decrypt(self)
    }
}
