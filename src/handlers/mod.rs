//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 핸들러 함수들입니다. 요청 검증과 응답 변환만 하고
//! 비즈니스 로직은 서비스 계층에 맡깁니다.
//!
//! ```text
//! Client
//!   │ HTTP Request/Response
//! Handlers (이 모듈)   ← Web Layer
//! Services            ← Service Layer
//! Repositories        ← Repository Layer
//! Entities/Models     ← Domain Layer
//! ```
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 회원가입, 로그인, 현재 사용자, 소셜 로그인
//! - **`tasks`**: 할 일 CRUD
//! - **`health`**: 헬스체크
//!
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 돌려주고, 에러 응답 변환은
//! [`AppError`](crate::core::AppError)의 `ResponseError` 구현이 맡습니다.

pub mod auth;
pub mod health;
pub mod tasks;
