//! 할 일 관리 서비스 백엔드
//!
//! 사용자별 할 일 CRUD API와 그 앞단의 인증 흐름을 제공합니다.
//! 로컬 계정(이메일/비밀번호)과 Google, GitHub 소셜 로그인을 지원하며,
//! 인증된 요청은 JWT 또는 서명된 세션 쿠키로 호출자를 식별합니다.
//!
//! # Features
//!
//! - **사용자 식별**: 로컬 가입/로그인, 소셜 로그인 시 사용자 조회 또는 생성
//! - **자격 증명**: HS256 JWT, MongoDB에 저장되는 서버 측 세션
//! - **요청 인증**: Bearer 헤더, `x-auth-token` 헤더, `sid` 쿠키
//! - **소유권 검사**: 할 일 수정/삭제는 만든 사용자만 가능
//! - **MongoDB**: 지연 연결, 유니크 인덱스 기반 중복 방지
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트 + 인증 미들웨어
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 사용자 식별, 토큰/세션, 소유권
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 저장소 트레이트와 MongoDB 구현
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     MongoDB     │ ← 저장소
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use task_service_backend::core::Singleton;
//! use task_service_backend::services::{auth::TokenService, users::UserService};
//!
//! let user = UserService::instance()?.resolve_local(&email, &password).await?;
//! let token = TokenService::instance().issue(&user_id)?;
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
