//! # 할 일 리포지토리 구현
//!
//! 변경과 삭제는 항상 `{_id, user}`로 필터링합니다. 서비스의 소유자 확인과
//! 실제 쓰기 사이에 문서가 바뀌어도 다른 사용자의 할 일은 건드리지 않습니다.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};

use singleton_macro::repository;

use crate::repositories::{map_mongo_error, TaskStore};
use crate::core::errors::{AppError, AppResult};
use crate::db::{Database, DatabaseHandle};
use crate::domain::entities::{Task, TaskChanges};

#[repository(name = "task", collection = "tasks")]
pub struct TaskRepository {
    handle: Arc<DatabaseHandle>,
}

impl TaskRepository {
    async fn collection(&self) -> AppResult<Collection<Task>> {
        Ok(self.handle.get().await?.collection::<Task>(self.collection_name()))
    }

    pub async fn create_indexes(&self, database: &Database) -> AppResult<()> {
        let owner_index = IndexModel::builder()
            .keys(doc! { "user": 1, "created_at": -1 })
            .options(IndexOptions::builder().name("user_created_at".to_string()).build())
            .build();

        database
            .collection::<Task>(self.collection_name())
            .create_index(owner_index)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// 최신순. 같은 밀리초에 생성된 문서는 `_id`(생성 순서)로 정렬합니다.
    fn newest_first() -> Document {
        doc! { "created_at": -1, "_id": -1 }
    }

    fn set_document(changes: &TaskChanges) -> Document {
        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(title) = &changes.title {
            set.insert("title", title);
        }
        if let Some(description) = &changes.description {
            set.insert("description", description);
        }
        if let Some(completed) = changes.completed {
            set.insert("completed", completed);
        }
        set
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Task>> {
        self.collection()
            .await?
            .find_one(doc! { "_id": *id })
            .await
            .map_err(map_mongo_error)
    }

    async fn list_by_owner(&self, owner: &ObjectId) -> AppResult<Vec<Task>> {
        let cursor = self
            .collection()
            .await?
            .find(doc! { "user": *owner })
            .sort(Self::newest_first())
            .await
            .map_err(map_mongo_error)?;

        cursor.try_collect().await.map_err(map_mongo_error)
    }

    async fn insert(&self, mut task: Task) -> AppResult<Task> {
        let result = self
            .collection()
            .await?
            .insert_one(&task)
            .await
            .map_err(map_mongo_error)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::DatabaseError("삽입된 할 일 ID가 ObjectId가 아닙니다".to_string()))?;
        task.id = Some(id);

        Ok(task)
    }

    async fn update_owned(&self, id: &ObjectId, owner: &ObjectId, changes: &TaskChanges) -> AppResult<Option<Task>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .await?
            .find_one_and_update(
                doc! { "_id": *id, "user": *owner },
                doc! { "$set": Self::set_document(changes) },
            )
            .with_options(options)
            .await
            .map_err(map_mongo_error)
    }

    async fn delete_owned(&self, id: &ObjectId, owner: &ObjectId) -> AppResult<bool> {
        let result = self
            .collection()
            .await?
            .delete_one(doc! { "_id": *id, "user": *owner })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_document_contains_only_given_fields() {
        let set = TaskRepository::set_document(&TaskChanges {
            completed: Some(false),
            ..Default::default()
        });

        assert_eq!(set.get_bool("completed").unwrap(), false);
        assert!(set.get("title").is_none());
        assert!(set.get("description").is_none());
        assert!(set.get("updated_at").is_some());
    }

    #[test]
    fn test_listing_order_breaks_timestamp_ties_by_id() {
        let sort = TaskRepository::newest_first();
        let keys: Vec<(&str, i32)> = sort
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_i32().unwrap()))
            .collect();

        assert_eq!(keys, vec![("created_at", -1), ("_id", -1)]);
    }
}
