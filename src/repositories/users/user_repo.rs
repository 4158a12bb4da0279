//! # 사용자 리포지토리 구현
//!
//! `users` 컬렉션의 MongoDB 구현입니다.
//!
//! ## 인덱스
//!
//! - `email_unique`: 이메일 유니크. 이메일이 있는 문서만 대상입니다.
//! - `identity_unique`: `identities` 원소 `{provider, external_id}` 유니크.
//!   외부 식별자가 있는 문서만 대상이며, 동시에 들어온 소셜 로그인 콜백이
//!   같은 외부 계정으로 두 사용자를 만들지 못하게 합니다.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};

use singleton_macro::repository;

use crate::repositories::{map_mongo_error, UserStore, EMAIL_INDEX, IDENTITY_INDEX};
use crate::config::FederatedProvider;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::db::{Database, DatabaseHandle};
use crate::domain::entities::{FederatedIdentity, User};

#[repository(name = "user", collection = "users")]
pub struct UserRepository {
    handle: Arc<DatabaseHandle>,
}

impl UserRepository {
    async fn collection(&self) -> AppResult<Collection<User>> {
        Ok(self.handle.get().await?.collection::<User>(self.collection_name()))
    }

    pub async fn create_indexes(&self, database: &Database) -> AppResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(EMAIL_INDEX.to_string())
                    .partial_filter_expression(doc! { "email": { "$type": "string" } })
                    .build(),
            )
            .build();

        let identity_index = IndexModel::builder()
            .keys(doc! { "identities": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(IDENTITY_INDEX.to_string())
                    .partial_filter_expression(doc! { "identities.provider": { "$exists": true } })
                    .build(),
            )
            .build();

        database
            .collection::<User>(self.collection_name())
            .create_indexes([email_index, identity_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>> {
        self.collection()
            .await?
            .find_one(doc! { "_id": *id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.collection()
            .await?
            .find_one(doc! { "email": email })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_identity(&self, provider: FederatedProvider, external_id: &str) -> AppResult<Option<User>> {
        // 인덱스와 같은 형태의 원소 전체 일치로 조회한다
        self.collection()
            .await?
            .find_one(doc! {
                "identities": { "provider": provider.as_str(), "external_id": external_id }
            })
            .await
            .map_err(map_mongo_error)
    }

    async fn insert(&self, mut user: User) -> AppResult<User> {
        let result = self
            .collection()
            .await?
            .insert_one(&user)
            .await
            .map_err(map_mongo_error)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::DatabaseError("삽입된 사용자 ID가 ObjectId가 아닙니다".to_string()))?;
        user.id = Some(id);

        Ok(user)
    }

    async fn add_identity(&self, user_id: &ObjectId, identity: FederatedIdentity) -> AppResult<Option<User>> {
        let identity = bson::to_bson(&identity).context("외부 식별자 직렬화 실패")?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .await?
            .find_one_and_update(
                doc! { "_id": *user_id },
                doc! {
                    "$addToSet": { "identities": identity },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .with_options(options)
            .await
            .map_err(map_mongo_error)
    }
}
