//! # 통합 에러 처리
//!
//! 애플리케이션 전역 에러 타입 [`AppError`]와 HTTP 응답 변환을 정의합니다.
//! 모든 에러 응답 본문은 `{"error": <코드>, "msg": <메시지>}` 형태입니다.
//!
//! | 변형 | 상태 코드 |
//! |------|-----------|
//! | `InvalidCredentials`, `DuplicateAccount`, `ValidationError` | 400 |
//! | `Unauthorized`, `Forbidden` | 401 |
//! | `NotFound`, `ProviderDisabled` | 404 |
//! | `DuplicateKey` | 409 |
//! | `ExternalServiceError` | 502 |
//! | `DatabaseUnavailable` | 503 |
//! | `ConfigurationMissing`, `DatabaseError`, `InternalError` | 500 |

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// 로그인 실패. 사용자 없음과 비밀번호 불일치를 구분하지 않습니다.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    DuplicateAccount,

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 자격 증명 없음, 형식 오류, 만료, 서명 불일치
    #[error("{0}")]
    Unauthorized(String),

    /// 다른 사용자의 리소스에 대한 변경 시도.
    ///
    /// 기존 프론트엔드와의 호환을 위해 403이 아닌 401로 응답합니다.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Provider disabled: {0}")]
    ProviderDisabled(String),

    /// 처리되지 않은 유니크 인덱스 위반. 값은 인덱스 이름입니다.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Database connection failed: {0}")]
    DatabaseUnavailable(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 응답 본문의 `error` 필드 값
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::DuplicateAccount => "duplicate_account",
            AppError::ValidationError(_) => "validation_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::ProviderDisabled(_) => "provider_disabled",
            AppError::DuplicateKey(_) => "duplicate_key",
            AppError::DatabaseUnavailable(_) => "database_unavailable",
            AppError::ConfigurationMissing(_) => "configuration_missing",
            AppError::DatabaseError(_) => "database_error",
            AppError::ExternalServiceError(_) => "external_service_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    /// 클라이언트에게 노출되는 메시지.
    ///
    /// 내부 오류의 상세 내용은 로그에만 남깁니다.
    fn public_message(&self) -> String {
        match self {
            AppError::DatabaseUnavailable(_) => "Database connection failed".to_string(),
            AppError::DatabaseError(_) | AppError::InternalError(_) | AppError::ConfigurationMissing(_) => {
                "Server Error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::DuplicateAccount
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::ProviderDisabled(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateKey(_) => StatusCode::CONFLICT,
            AppError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigurationMissing(_)
            | AppError::DatabaseError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("요청 처리 실패 ({}): {}", status.as_u16(), self);
        }

        HttpResponse::build(status).json(json!({
            "error": self.code(),
            "msg": self.public_message(),
        }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// 외부 에러에 문맥을 붙여 [`AppError::InternalError`]로 변환합니다.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
