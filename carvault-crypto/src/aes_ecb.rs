use aes::Aes128;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

use crate::{Crypto, CryptoError, KeyProvider};

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

const KEY_LEN: usize = 16;

/// AES-128/ECB/PKCS#7 over UTF-8 text, base64 on the outside.
#[derive(Clone)]
pub struct AesEcbCodec {
    key: [u8; KEY_LEN],
}

impl AesEcbCodec {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| {
            CryptoError::Cipher(format!(
                "key must be {KEY_LEN} bytes for AES-128, got {}",
                key.len()
            ))
        })?;

        Ok(Self { key })
    }

    pub fn from_provider(provider: &dyn KeyProvider) -> Result<Self, CryptoError> {
        Self::new(&provider.key()?)
    }

    fn seal(&self, plaintext: &[u8]) -> Vec<u8> {
        Aes128EcbEnc::new(&self.key.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Aes128EcbDec::new(&self.key.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| CryptoError::Cipher(format!("unable to decrypt: {e}")))
    }
}

impl std::fmt::Debug for AesEcbCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesEcbCodec")
    }
}

impl Crypto for AesEcbCodec {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        Ok(STANDARD.encode(self.seal(plaintext.as_bytes())))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let bytes = STANDARD.decode(ciphertext).inspect_err(|e| {
            debug!(error = %e, "ciphertext is not base64");
        })?;
        let plaintext = self.open(&bytes)?;
        Ok(String::from_utf8(plaintext)?)
    }
}
