//! # 할 일 서비스
//!
//! 인증된 호출자 범위의 할 일 CRUD입니다.
//!
//! 수정과 삭제는 [`ownership::authorize`]를 먼저 통과해야 하고, 저장소 쓰기 자체도
//! `{_id, user}`로 필터링됩니다. 검사와 쓰기 사이에 문서가 사라지면 `NotFound`가 됩니다.

use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use super::ownership::{self, Decision, Denial, TASK_NOT_FOUND_MESSAGE};
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Singleton;
use crate::domain::dto::{CreateTaskRequest, UpdateTaskRequest};
use crate::domain::entities::Task;
use crate::repositories::TaskStore;
use crate::utils::string_utils::{clean_optional_string, validate_required_string};

pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl Singleton for TaskService {}

fn not_found() -> AppError {
    AppError::NotFound(TASK_NOT_FOUND_MESSAGE.to_string())
}

/// 형식이 틀린 ID는 없는 할 일로 취급합니다.
fn parse_task_id(task_id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(task_id).map_err(|_| not_found())
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// 호출자의 할 일, 최신순
    pub async fn list_for(&self, caller: &ObjectId) -> AppResult<Vec<Task>> {
        self.tasks.list_by_owner(caller).await
    }

    pub async fn create(&self, caller: &ObjectId, request: CreateTaskRequest) -> AppResult<Task> {
        let title = validate_required_string(&request.title, "title")?;
        let description = clean_optional_string(request.description);

        self.tasks.insert(Task::new(*caller, title, description)).await
    }

    pub async fn update(&self, caller: &ObjectId, task_id: &str, request: UpdateTaskRequest) -> AppResult<Task> {
        let id = parse_task_id(task_id)?;
        let existing = self.check_owner(caller, &id).await?;

        let changes = request.to_changes();
        if changes.is_empty() {
            return Ok(existing);
        }

        self.tasks
            .update_owned(&id, caller, &changes)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, caller: &ObjectId, task_id: &str) -> AppResult<()> {
        let id = parse_task_id(task_id)?;
        self.check_owner(caller, &id).await?;

        if !self.tasks.delete_owned(&id, caller).await? {
            return Err(not_found());
        }

        info!("할 일 삭제: {}", id.to_hex());
        Ok(())
    }

    async fn check_owner(&self, caller: &ObjectId, id: &ObjectId) -> AppResult<Task> {
        let task = self.tasks.find_by_id(id).await?;
        let decision = ownership::authorize(caller, task.as_ref());

        if decision == Decision::Deny(Denial::Forbidden) {
            warn!("소유자가 아닌 사용자 {}의 할 일 {} 변경 시도", caller.to_hex(), id.to_hex());
        }
        decision.into_result()?;

        task.ok_or_else(not_found)
    }
}
