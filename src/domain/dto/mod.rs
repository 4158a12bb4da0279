//! # Data Transfer Objects
//!
//! HTTP 요청/응답 본문 타입입니다. 요청 DTO는 `validator`로 검증합니다.

pub mod tasks;
pub mod users;

pub use tasks::*;
pub use users::*;

use mongodb::bson::DateTime;

/// 응답용 RFC 3339 타임스탬프
pub(crate) fn format_timestamp(at: DateTime) -> String {
    at.try_to_rfc3339_string().unwrap_or_default()
}
