use serde::Serialize;

use crate::domain::dto::format_timestamp;
use crate::domain::entities::Task;

/// 클라이언트에 내려가는 할 일 표현
///
/// 프론트엔드는 `_id`, `createdAt` 등 Mongoose 직렬화 필드명을 그대로 사용합니다.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub user: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: task.title,
            description: task.description,
            completed: task.completed,
            user: task.user.to_hex(),
            created_at: format_timestamp(task.created_at),
            updated_at: format_timestamp(task.updated_at),
        }
    }
}

/// `DELETE /api/tasks/{id}` 응답
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_task_response_uses_client_field_names() {
        let owner = ObjectId::new();
        let mut task = Task::new(owner, "t".to_string(), None);
        task.id = Some(ObjectId::new());

        let json = serde_json::to_value(TaskResponse::from(task)).unwrap();

        assert_eq!(json["title"], "t");
        assert_eq!(json["completed"], false);
        assert_eq!(json["user"], owner.to_hex());
        assert!(json.get("description").is_none());
        assert!(json["createdAt"].as_str().unwrap().ends_with('Z'));
        assert!(json.get("_id").is_some());
    }
}
