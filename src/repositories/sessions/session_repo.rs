use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use singleton_macro::repository;

use crate::repositories::{map_mongo_error, SessionStore};
use crate::core::errors::{AppError, AppResult};
use crate::db::{Database, DatabaseHandle};
use crate::domain::entities::SessionRecord;

/// `sessions` 컬렉션. 만료 문서는 `expires_at` TTL 인덱스로 정리됩니다.
#[repository(name = "session", collection = "sessions")]
pub struct SessionRepository {
    handle: Arc<DatabaseHandle>,
}

impl SessionRepository {
    async fn collection(&self) -> AppResult<Collection<SessionRecord>> {
        Ok(self.handle.get().await?.collection::<SessionRecord>(self.collection_name()))
    }

    pub async fn create_indexes(&self, database: &Database) -> AppResult<()> {
        let ttl_index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("expires_at_ttl".to_string())
                    .expire_after(std::time::Duration::from_secs(0))
                    .build(),
            )
            .build();

        database
            .collection::<SessionRecord>(self.collection_name())
            .create_index(ttl_index)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn insert(&self, session: SessionRecord) -> AppResult<()> {
        self.collection()
            .await?
            .insert_one(&session)
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> AppResult<Option<SessionRecord>> {
        self.collection()
            .await?
            .find_one(doc! { "_id": token_hash })
            .await
            .map_err(map_mongo_error)
    }
}
