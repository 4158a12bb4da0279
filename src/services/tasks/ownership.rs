//! 할 일 소유권 검사
//!
//! 수정과 삭제 직전에 호출자가 대상 할 일의 소유자인지 판단합니다.
//! 목록 조회는 소유자 필터로 대신하므로 여기를 거치지 않습니다.

use mongodb::bson::oid::ObjectId;

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::Task;

pub const TASK_NOT_FOUND_MESSAGE: &str = "Task not found";
pub const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotFound,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(Denial::NotFound) => Err(AppError::NotFound(TASK_NOT_FOUND_MESSAGE.to_string())),
            Decision::Deny(Denial::Forbidden) => Err(AppError::Forbidden(NOT_AUTHORIZED_MESSAGE.to_string())),
        }
    }
}

pub fn authorize(caller: &ObjectId, task: Option<&Task>) -> Decision {
    match task {
        None => Decision::Deny(Denial::NotFound),
        Some(task) if task.is_owned_by(caller) => Decision::Allow,
        Some(_) => Decision::Deny(Denial::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize() {
        let owner = ObjectId::new();
        let stranger = ObjectId::new();
        let task = Task::new(owner, "t".to_string(), None);

        assert_eq!(authorize(&owner, Some(&task)), Decision::Allow);
        assert_eq!(authorize(&stranger, Some(&task)), Decision::Deny(Denial::Forbidden));
        assert_eq!(authorize(&owner, None), Decision::Deny(Denial::NotFound));
    }

    #[test]
    fn test_denials_map_to_errors() {
        assert!(matches!(
            Decision::Deny(Denial::Forbidden).into_result(),
            Err(AppError::Forbidden(msg)) if msg == NOT_AUTHORIZED_MESSAGE
        ));
        assert!(matches!(
            Decision::Deny(Denial::NotFound).into_result(),
            Err(AppError::NotFound(_))
        ));
    }
}
