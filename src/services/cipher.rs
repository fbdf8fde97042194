//! Symmetric encryption of provider tokens at rest.
//!
//! AES in CFB mode with a random 16-byte IV per message. The output is
//! `hex(iv || ciphertext)`. There is no authentication tag, so tampering is
//! not detected on decrypt.

use aes::{Aes128, Aes192, Aes256};
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use cfb_mode::{Decryptor, Encryptor};

/// AES block (and IV) size in bytes.
pub const IV_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid key size {0}, expected 16, 24 or 32 bytes")]
    InvalidKeySize(usize),

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(hex::FromHexError),

    #[error("ciphertext is not valid hex: {0}")]
    InvalidHex(hex::FromHexError),

    #[error("ciphertext is shorter than the IV")]
    TooShort,

    #[error("decrypted token is not valid UTF-8")]
    InvalidUtf8,

    #[error("cipher initialization failed")]
    Init,
}

#[derive(Clone, Copy)]
enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

/// AES-CFB cipher bound to a single key.
#[derive(Clone)]
pub struct SymmetricCipher {
    key: Vec<u8>,
    size: KeySize,
}

impl std::fmt::Debug for SymmetricCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SymmetricCipher {
    /// Create a cipher from a raw 16, 24 or 32 byte key.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let size = match key.len() {
            16 => KeySize::Aes128,
            24 => KeySize::Aes192,
            32 => KeySize::Aes256,
            other => return Err(CipherError::InvalidKeySize(other)),
        };

        Ok(Self {
            key: key.to_vec(),
            size,
        })
    }

    /// Create a cipher from a hex-encoded key.
    pub fn from_hex(key: &str) -> Result<Self, CipherError> {
        let bytes = hex::decode(key.trim()).map_err(CipherError::InvalidKeyEncoding)?;
        Self::new(&bytes)
    }

    /// Encrypt `plaintext` under a fresh IV and return `hex(iv || ciphertext)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let iv: [u8; IV_SIZE] = rand::random();
        let mut buf = plaintext.as_bytes().to_vec();

        match self.size {
            KeySize::Aes128 => Encryptor::<Aes128>::new_from_slices(&self.key, &iv)
                .map_err(|_| CipherError::Init)?
                .encrypt(&mut buf),
            KeySize::Aes192 => Encryptor::<Aes192>::new_from_slices(&self.key, &iv)
                .map_err(|_| CipherError::Init)?
                .encrypt(&mut buf),
            KeySize::Aes256 => Encryptor::<Aes256>::new_from_slices(&self.key, &iv)
                .map_err(|_| CipherError::Init)?
                .encrypt(&mut buf),
        }

        let mut out = Vec::with_capacity(IV_SIZE + buf.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&buf);
        Ok(hex::encode(out))
    }

    /// Reverse of [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, encoded: &str) -> Result<String, CipherError> {
        let raw = hex::decode(encoded).map_err(CipherError::InvalidHex)?;
        if raw.len() < IV_SIZE {
            return Err(CipherError::TooShort);
        }

        let (iv, ciphertext) = raw.split_at(IV_SIZE);
        let mut buf = ciphertext.to_vec();

        match self.size {
            KeySize::Aes128 => Decryptor::<Aes128>::new_from_slices(&self.key, iv)
                .map_err(|_| CipherError::Init)?
                .decrypt(&mut buf),
            KeySize::Aes192 => Decryptor::<Aes192>::new_from_slices(&self.key, iv)
                .map_err(|_| CipherError::Init)?
                .decrypt(&mut buf),
            KeySize::Aes256 => Decryptor::<Aes256>::new_from_slices(&self.key, iv)
                .map_err(|_| CipherError::Init)?
                .decrypt(&mut buf),
        }

        String::from_utf8(buf).map_err(|_| CipherError::InvalidUtf8)
    }
}
