//! Task HTTP Handlers
//!
//! 인증된 호출자의 할 일 CRUD 엔드포인트입니다. 모든 라우트는 인증 미들웨어 뒤에 있습니다.
//!
//! | 메서드 | 경로 | 실패 |
//! |--------|------|------|
//! | GET | `/api/tasks` | |
//! | POST | `/api/tasks` | 400 제목 누락 |
//! | PUT | `/api/tasks/{id}` | 404 없음, 401 소유자 아님 |
//! | DELETE | `/api/tasks/{id}` | 404 없음, 401 소유자 아님 |
use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::core::errors::AppError;
use crate::core::registry::Singleton;
use crate::domain::{AuthenticatedUser, CreateTaskRequest, MessageResponse, TaskResponse, UpdateTaskRequest};
use crate::services::tasks::TaskService;

#[get("")]
pub async fn list_tasks(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let tasks = TaskService::instance()?.list_for(&user.user_id).await?;
    let body: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();

    Ok(HttpResponse::Ok().json(body))
}

#[post("")]
pub async fn create_task(
    user: AuthenticatedUser,
    payload: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let task = TaskService::instance()?
        .create(&user.user_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(TaskResponse::from(task)))
}

#[put("/{task_id}")]
pub async fn update_task(
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let task = TaskService::instance()?
        .update(&user.user_id, &task_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(TaskResponse::from(task)))
}

#[delete("/{task_id}")]
pub async fn delete_task(user: AuthenticatedUser, task_id: web::Path<String>) -> Result<HttpResponse, AppError> {
    TaskService::instance()?.delete(&user.user_id, &task_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse { msg: "Task removed" }))
}
