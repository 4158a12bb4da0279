//! # Domain Layer Module
//!
//! 도메인 계층을 구성하는 모듈입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities  - MongoDB에 저장되는 객체 (User, Task, SessionRecord)
//! ├── DTOs      - HTTP 요청/응답 본문
//! └── Models    - 저장되지 않는 모델 (인증된 호출자, JWT 클레임, 외부 프로필)
//! ```

pub mod dto;
pub mod entities;
pub mod models;

pub use dto::*;
pub use entities::*;
pub use models::*;
