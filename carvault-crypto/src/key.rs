use crate::CryptoError;

/// Key used by earlier releases; rows written by them can only be read with it.
pub const LEGACY_KEY: &[u8; 16] = b"sfj$cPAH%kXNMj2N";

/// Source of the symmetric key.
pub trait KeyProvider {
    fn key(&self) -> Result<Vec<u8>, CryptoError>;
}

#[derive(Clone)]
pub struct StaticKey(Box<[u8]>);

impl StaticKey {
    pub fn new(key: impl Into<Box<[u8]>>) -> Self {
        Self(key.into())
    }

    pub fn legacy() -> Self {
        Self::new(LEGACY_KEY.to_vec())
    }
}

impl KeyProvider for StaticKey {
    fn key(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(self.0.to_vec())
    }
}

impl std::fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKey").field("len", &self.0.len()).finish()
    }
}

/// Reads the key bytes from an environment variable at resolve time.
#[derive(Debug, Clone)]
pub struct EnvKey {
    var: String,
}

impl EnvKey {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl KeyProvider for EnvKey {
    fn key(&self) -> Result<Vec<u8>, CryptoError> {
        std::env::var(&self.var)
            .map(String::into_bytes)
            .map_err(|_| CryptoError::MissingKey(self.var.clone()))
    }
}
