//! 세션과 OAuth state에 쓰는 암호 유틸리티

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::core::errors::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// 암호학적으로 안전한 난수로 만든 URL-safe 토큰
pub fn random_token(byte_len: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(byte_len))
}

pub fn random_bytes(byte_len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// HMAC-SHA256 서명 (URL-safe base64)
pub fn sign(key: &[u8], payload: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::InternalError(format!("HMAC 키 오류: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// 서명을 다시 계산해 상수 시간으로 비교합니다.
pub fn verify_signature(key: &[u8], payload: &str, signature: &str) -> bool {
    match sign(key, payload) {
        Ok(expected) => constant_time_eq(expected.as_bytes(), signature.as_bytes()),
        Err(_) => false,
    }
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
