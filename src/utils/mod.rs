//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - 입력 문자열 검증과 정리
//! - [`crypto`] - 임의 토큰 생성, 해시, HMAC 서명과 상수 시간 비교

pub mod crypto;
pub mod string_utils;
