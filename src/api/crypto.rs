//! Key derivation, request signing and payload encryption used by My.JDownloader.
//!
//! Every secret is a SHA-256 digest. Its first half is the AES-128-CBC IV
//! and its second half the key; payloads travel as base64 text.

use crate::error::JdError::Crypto;
use aes::Aes128;
use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

pub type Secret = [u8; 32];

/// Domain of the login secret used for server calls
pub const SERVER_DOMAIN: &str = "server";
/// Domain of the secret used for device calls
pub const DEVICE_DOMAIN: &str = "device";

/// Derives the account secret for the given domain
#[must_use]
pub fn secret(email: &str, password: &str, domain: &str) -> Secret {
    let mut hasher = Sha256::new();
    hasher.update(email.to_lowercase().as_bytes());
    hasher.update(password.as_bytes());
    hasher.update(domain.as_bytes());
    hasher.finalize().into()
}

/// Derives a session encryption token from a secret and the hex session token
///
/// # Errors
///
/// Returns an error if the session token is not valid hex
pub fn update_token(secret: &Secret, session_token: &str) -> Result<Secret> {
    let token = hex::decode(session_token)
        .map_err(|e| Crypto(format!("session token is not hex encoded: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(token);
    Ok(hasher.finalize().into())
}

/// Signs a query string with HMAC-SHA256, returning lowercase hex
///
/// # Errors
///
/// Returns an error if the key is rejected by the MAC
pub fn sign(key: &Secret, data: &str) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| Crypto(format!("invalid key: {e}")))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Encrypts a payload and encodes it as base64
///
/// # Errors
///
/// Returns an error if the cipher cannot be initialised
pub fn encrypt(secret: &Secret, plaintext: &str) -> Result<String> {
    let (iv, key) = secret.split_at(16);
    let cipher = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| Crypto(format!("invalid key length: {e}")))?;
    let encrypted = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    Ok(BASE64.encode(encrypted))
}

/// Decodes and decrypts a base64 payload
///
/// # Errors
///
/// Returns an error if:
/// - The payload is not valid base64
/// - Decryption or unpadding fails (usually a wrong secret)
/// - The plaintext is not UTF-8
pub fn decrypt(secret: &Secret, payload: &str) -> Result<String> {
    let data = BASE64
        .decode(payload.trim())
        .map_err(|e| Crypto(format!("payload is not base64 encoded: {e}")))?;
    let (iv, key) = secret.split_at(16);
    let cipher = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|e| Crypto(format!("invalid key length: {e}")))?;
    let decrypted = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&data)
        .map_err(|_| Crypto("unable to decrypt payload".into()))?;
    String::from_utf8(decrypted).map_err(|e| Crypto(format!("payload is not UTF-8: {e}")).into())
}
