use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 서버 측 세션 레코드
///
/// 원본 세션 토큰은 저장하지 않고 SHA-256 해시(hex)를 `_id`로 씁니다.
/// `expires_at`에는 TTL 인덱스가 걸려 있어 만료된 문서는 MongoDB가 지웁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "_id")]
    pub token_hash: String,
    pub user_id: ObjectId,
    pub created_at: DateTime,
    pub expires_at: DateTime,
}

impl SessionRecord {
    /// TTL 인덱스는 주기적으로만 돌기 때문에 조회 시점에도 만료를 확인합니다.
    pub fn is_expired_at(&self, now: DateTime) -> bool {
        self.expires_at <= now
    }
}
