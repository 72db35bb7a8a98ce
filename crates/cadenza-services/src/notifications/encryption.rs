//! Push message encryption (RFC 8291)
//!
//! Payloads are sealed for one subscription with the `aes128gcm` content
//! coding of RFC 8188: a fresh P-256 key pair and salt per message, ECDH
//! against the browser's `p256dh` key, and HKDF-SHA-256 keyed by the `auth`
//! secret. The whole payload fits a single record.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand_core::{OsRng, RngCore};
use serde_json::Value as JsonValue;
use sha2::Sha256;

const SALT_LEN: usize = 16;
const AUTH_SECRET_LEN: usize = 16;
/// Uncompressed SEC1 point
const PUBLIC_KEY_LEN: usize = 65;
const TAG_LEN: usize = 16;
const RECORD_SIZE: u32 = 4096;

/// salt | record size | key id length | key id
pub const HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;

/// Push services cap the encrypted body at 4096 bytes
pub const MAX_PLAINTEXT_LEN: usize = 4096 - HEADER_LEN - TAG_LEN - 1;

/// Padding delimiter closing the last (only) record
const LAST_RECORD: u8 = 0x02;

const KEY_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Invalid subscription keys: {0}")]
    InvalidKeys(String),

    #[error("Payload of {0} bytes exceeds the push limit")]
    PayloadTooLarge(usize),

    #[error("Encryption failed: {0}")]
    Crypto(String),
}

/// Browser-side keys of a subscription, decoded from its `keys` object
pub struct SubscriptionKeys {
    public_key: PublicKey,
    public_raw: Vec<u8>,
    auth: [u8; AUTH_SECRET_LEN],
}

impl SubscriptionKeys {
    /// Parse `{p256dh, auth}` as sent by `PushSubscription.toJSON()`
    pub fn from_json(keys: &JsonValue) -> Result<Self, EncryptionError> {
        let field = |name: &str| {
            keys.get(name)
                .and_then(JsonValue::as_str)
                .ok_or_else(|| EncryptionError::InvalidKeys(format!("missing '{}'", name)))
                .and_then(|value| decode(name, value))
        };

        let public_raw = field("p256dh")?;
        if public_raw.len() != PUBLIC_KEY_LEN {
            return Err(EncryptionError::InvalidKeys(format!(
                "p256dh must be {} bytes, got {}",
                PUBLIC_KEY_LEN,
                public_raw.len()
            )));
        }
        let public_key = PublicKey::from_sec1_bytes(&public_raw)
            .map_err(|_| EncryptionError::InvalidKeys("p256dh is not a P-256 point".to_string()))?;

        let auth: [u8; AUTH_SECRET_LEN] = field("auth")?.try_into().map_err(|bytes: Vec<u8>| {
            EncryptionError::InvalidKeys(format!(
                "auth must be {} bytes, got {}",
                AUTH_SECRET_LEN,
                bytes.len()
            ))
        })?;

        Ok(Self {
            public_key,
            public_raw,
            auth,
        })
    }
}

fn decode(name: &str, value: &str) -> Result<Vec<u8>, EncryptionError> {
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| EncryptionError::InvalidKeys(format!("'{}' is not base64url: {}", name, e)))
}

/// Seal `plaintext` for one subscription; returns the full request body
pub fn encrypt(keys: &SubscriptionKeys, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let secret = EphemeralSecret::random(&mut OsRng);
    let sender_public = secret.public_key().to_encoded_point(false);
    let shared = secret.diffie_hellman(&keys.public_key);

    seal(
        shared.raw_secret_bytes().as_slice(),
        sender_public.as_bytes(),
        keys,
        &salt,
        plaintext,
    )
}

fn seal(
    ecdh_secret: &[u8],
    sender_public: &[u8],
    keys: &SubscriptionKeys,
    salt: &[u8; SALT_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(EncryptionError::PayloadTooLarge(plaintext.len()));
    }

    let (cek, nonce) = derive_key_and_nonce(
        ecdh_secret,
        &keys.auth,
        &keys.public_raw,
        sender_public,
        salt,
    )?;

    let mut record = Vec::with_capacity(plaintext.len() + 1);
    record.extend_from_slice(plaintext);
    record.push(LAST_RECORD);

    let cipher =
        Aes128Gcm::new_from_slice(&cek).map_err(|e| EncryptionError::Crypto(e.to_string()))?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), record.as_slice())
        .map_err(|e| EncryptionError::Crypto(e.to_string()))?;

    let mut body = Vec::with_capacity(HEADER_LEN + sealed.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(PUBLIC_KEY_LEN as u8);
    body.extend_from_slice(sender_public);
    body.extend_from_slice(&sealed);
    Ok(body)
}

/// Content encryption key and nonce. Sender and receiver derive the same
/// pair from their own side of the ECDH exchange.
fn derive_key_and_nonce(
    ecdh_secret: &[u8],
    auth: &[u8],
    receiver_public: &[u8],
    sender_public: &[u8],
    salt: &[u8],
) -> Result<([u8; 16], [u8; 12]), EncryptionError> {
    let mut key_info =
        Vec::with_capacity(KEY_INFO_PREFIX.len() + receiver_public.len() + sender_public.len());
    key_info.extend_from_slice(KEY_INFO_PREFIX);
    key_info.extend_from_slice(receiver_public);
    key_info.extend_from_slice(sender_public);

    let mut ikm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(auth), ecdh_secret)
        .expand(&key_info, &mut ikm)
        .map_err(|e| EncryptionError::Crypto(e.to_string()))?;

    let prk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; 16];
    prk.expand(CEK_INFO, &mut cek)
        .map_err(|e| EncryptionError::Crypto(e.to_string()))?;
    let mut nonce = [0u8; 12];
    prk.expand(NONCE_INFO, &mut nonce)
        .map_err(|e| EncryptionError::Crypto(e.to_string()))?;

    Ok((cek, nonce))
}
