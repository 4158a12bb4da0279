//! 할 일 서비스 모듈
//!
//! - [`TaskService`] - 호출자 범위의 할 일 CRUD
//! - [`ownership`] - 수정/삭제 전 소유권 판단

pub mod ownership;
pub mod task_service;

pub use ownership::{authorize, Decision, Denial};
pub use task_service::TaskService;
