//! # Core Module
//!
//! 애플리케이션 전역에서 쓰는 기반 기능을 모아 둔 모듈입니다.
//!
//! - [`errors`] - 통합 에러 타입 `AppError`와 HTTP 응답 변환
//! - [`registry`] - 싱글톤 컨테이너 `ServiceLocator`

pub mod errors;
pub mod registry;

pub use errors::{AppError, AppResult, ErrorContext};
pub use registry::{ServiceLocator, Singleton};
