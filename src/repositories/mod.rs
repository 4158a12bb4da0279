//! # Repository Layer
//!
//! 저장소 접근을 트레이트 뒤로 숨깁니다. 서비스는 `Arc<dyn UserStore>` 등만 알고,
//! 운영에서는 MongoDB 구현을, 테스트에서는 메모리 구현을 주입받습니다.
//!
//! 유니크 제약은 저장소 계층에서 강제합니다. 위반은 인덱스 이름을 담은
//! [`AppError::DuplicateKey`]로 올라오며, 이 중 어떤 것을 "이미 있음"으로 볼지는
//! 서비스가 결정합니다.

pub mod sessions;
pub mod tasks;
pub mod users;

#[cfg(test)]
pub mod memory;

pub use sessions::SessionRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};

use crate::config::FederatedProvider;
use crate::core::errors::{AppError, AppResult};
use crate::db::Database;
use crate::domain::entities::{FederatedIdentity, SessionRecord, Task, TaskChanges, User};

/// 이메일 유니크 인덱스 이름
pub const EMAIL_INDEX: &str = "email_unique";
/// (프로바이더, 외부 ID) 유니크 인덱스 이름
pub const IDENTITY_INDEX: &str = "identity_unique";

const DUPLICATE_KEY_CODE: i32 = 11000;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_identity(&self, provider: FederatedProvider, external_id: &str) -> AppResult<Option<User>>;

    /// 새 사용자를 저장하고 `_id`가 채워진 사용자를 돌려줍니다.
    async fn insert(&self, user: User) -> AppResult<User>;

    /// 기존 사용자에 외부 식별자를 추가합니다. 사용자가 없으면 `None`.
    async fn add_identity(&self, user_id: &ObjectId, identity: FederatedIdentity) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Task>>;

    /// 소유자의 할 일을 최신순으로 돌려줍니다.
    async fn list_by_owner(&self, owner: &ObjectId) -> AppResult<Vec<Task>>;

    async fn insert(&self, task: Task) -> AppResult<Task>;

    /// `_id`와 소유자가 모두 일치할 때만 변경합니다. 일치하는 문서가 없으면 `None`.
    async fn update_owned(&self, id: &ObjectId, owner: &ObjectId, changes: &TaskChanges) -> AppResult<Option<Task>>;

    /// `_id`와 소유자가 모두 일치할 때만 삭제합니다.
    async fn delete_owned(&self, id: &ObjectId, owner: &ObjectId) -> AppResult<bool>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: SessionRecord) -> AppResult<()>;

    async fn find(&self, token_hash: &str) -> AppResult<Option<SessionRecord>>;
}

/// 연결 직후 모든 컬렉션의 인덱스를 보장합니다.
pub async fn ensure_indexes(database: &Database) -> AppResult<()> {
    UserRepository::instance().create_indexes(database).await?;
    TaskRepository::instance().create_indexes(database).await?;
    SessionRepository::instance().create_indexes(database).await?;
    Ok(())
}

/// MongoDB 에러를 [`AppError`]로 바꿉니다. 유니크 위반은 인덱스 이름을 보존합니다.
pub(crate) fn map_mongo_error(err: MongoError) -> AppError {
    match duplicate_key_index(&err) {
        Some(index) => AppError::DuplicateKey(index),
        None => AppError::DatabaseError(err.to_string()),
    }
}

fn duplicate_key_index(err: &MongoError) -> Option<String> {
    let message = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE => {
            &write_error.message
        }
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => &command_error.message,
        _ => return None,
    };

    Some(index_name_from_message(message))
}

/// `E11000 duplicate key error collection: db.users index: email_unique dup key: ...`
fn index_name_from_message(message: &str) -> String {
    message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name_is_parsed_from_server_message() {
        let message = "E11000 duplicate key error collection: taskboard.users index: identity_unique dup key: { identities: { provider: \"github\", external_id: \"1\" } }";
        assert_eq!(index_name_from_message(message), IDENTITY_INDEX);
        assert_eq!(index_name_from_message("E11000 duplicate key error"), "unknown");
    }
}
