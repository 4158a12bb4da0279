//! 테스트용 메모리 저장소
//!
//! MongoDB 인덱스와 같은 유니크 규칙을 한 번의 잠금 안에서 검사하므로,
//! 동시 삽입 경쟁에서도 운영 저장소와 같은 `DuplicateKey` 에러를 냅니다.
//! 조회 전에 한 번 양보해서 "조회 후 삽입" 사이에 다른 태스크가 끼어들 수 있게 합니다.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};

use super::{SessionStore, TaskStore, UserStore, EMAIL_INDEX, IDENTITY_INDEX};
use crate::config::FederatedProvider;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::{FederatedIdentity, SessionRecord, Task, TaskChanges, User};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn count_with_identity(&self, provider: FederatedProvider, external_id: &str) -> usize {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| user.has_identity(provider, external_id))
            .count()
    }

    pub fn count_with_email(&self, email: &str) -> usize {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| user.email.as_deref() == Some(email))
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>> {
        tokio::task::yield_now().await;
        Ok(self.users.lock().unwrap().iter().find(|user| user.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        tokio::task::yield_now().await;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_identity(&self, provider: FederatedProvider, external_id: &str) -> AppResult<Option<User>> {
        tokio::task::yield_now().await;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.has_identity(provider, external_id))
            .cloned())
    }

    async fn insert(&self, mut user: User) -> AppResult<User> {
        tokio::task::yield_now().await;
        let mut users = self.users.lock().unwrap();

        if let Some(email) = &user.email {
            if users.iter().any(|existing| existing.email.as_ref() == Some(email)) {
                return Err(AppError::DuplicateKey(EMAIL_INDEX.to_string()));
            }
        }
        let identity_taken = user.identities.iter().any(|identity| {
            users
                .iter()
                .any(|existing| existing.has_identity(identity.provider, &identity.external_id))
        });
        if identity_taken {
            return Err(AppError::DuplicateKey(IDENTITY_INDEX.to_string()));
        }

        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn add_identity(&self, user_id: &ObjectId, identity: FederatedIdentity) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();

        let taken_elsewhere = users.iter().any(|existing| {
            existing.id.as_ref() != Some(user_id) && existing.has_identity(identity.provider, &identity.external_id)
        });
        if taken_elsewhere {
            return Err(AppError::DuplicateKey(IDENTITY_INDEX.to_string()));
        }

        let Some(user) = users.iter_mut().find(|user| user.id.as_ref() == Some(user_id)) else {
            return Ok(None);
        };
        if !user.identities.contains(&identity) {
            user.identities.push(identity);
        }
        user.updated_at = DateTime::now();
        Ok(Some(user.clone()))
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn snapshot(&self, id: &ObjectId) -> Option<Task> {
        self.tasks.lock().unwrap().iter().find(|task| task.id.as_ref() == Some(id)).cloned()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Task>> {
        Ok(self.snapshot(id))
    }

    async fn list_by_owner(&self, owner: &ObjectId) -> AppResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|task| task.is_owned_by(owner))
            .cloned()
            .collect();
        // 같은 밀리초에 생성된 문서는 ObjectId(생성 순서)로 정렬
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn insert(&self, mut task: Task) -> AppResult<Task> {
        task.id = Some(ObjectId::new());
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_owned(&self, id: &ObjectId, owner: &ObjectId, changes: &TaskChanges) -> AppResult<Option<Task>> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks
            .iter_mut()
            .find(|task| task.id.as_ref() == Some(id) && task.is_owned_by(owner))
        else {
            return Ok(None);
        };

        changes.apply_to(task);
        Ok(Some(task.clone()))
    }

    async fn delete_owned(&self, id: &ObjectId, owner: &ObjectId) -> AppResult<bool> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|task| !(task.id.as_ref() == Some(id) && task.is_owned_by(owner)));
        Ok(tasks.len() < before)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: SessionRecord) -> AppResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.token_hash) {
            return Err(AppError::DuplicateKey("_id_".to_string()));
        }
        sessions.insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> AppResult<Option<SessionRecord>> {
        Ok(self.sessions.lock().unwrap().get(token_hash).cloned())
    }
}
