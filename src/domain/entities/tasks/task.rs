use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// `tasks` 컬렉션 문서
///
/// `user`(소유자)는 생성 후 바뀌지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    pub user: ObjectId,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Task {
    pub fn new(owner: ObjectId, title: String, description: Option<String>) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            title,
            description,
            completed: false,
            user: owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user == user_id
    }
}

/// 소유자 확인을 통과한 뒤 적용할 부분 변경
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// 메모리 상의 문서에 변경을 적용하고 `updated_at`을 갱신합니다.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = DateTime::now();
    }
}
