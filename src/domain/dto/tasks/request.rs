use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::TaskChanges;

/// `POST /api/tasks`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 500, message = "제목을 입력해주세요"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 10000, message = "설명이 너무 깁니다"))]
    pub description: Option<String>,
}

/// `PUT /api/tasks/{id}`
///
/// 빠진 필드는 바꾸지 않습니다. `title`과 `description`은 빈 문자열이면 무시되고,
/// `completed`는 값이 있으면 `false`라도 반영됩니다.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    #[validate(length(max = 500, message = "제목이 너무 깁니다"))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10000, message = "설명이 너무 깁니다"))]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateTaskRequest {
    pub fn effective_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|title| !title.is_empty())
    }

    pub fn effective_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|description| !description.is_empty())
    }

    pub fn to_changes(&self) -> TaskChanges {
        TaskChanges {
            title: self.effective_title().map(str::to_string),
            description: self.effective_description().map(str::to_string),
            completed: self.completed,
        }
    }
}
