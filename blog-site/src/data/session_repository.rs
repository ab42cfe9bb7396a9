use async_trait::async_trait;

use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewSession {
    pub(crate) id: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: i64,
    pub(crate) expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionRecord {
    pub(crate) id: String,
    pub(crate) user_id: i64,
    pub(crate) expires_at: i64,
}

/// Server-side session store. Timestamps are unix seconds.
#[async_trait]
pub(crate) trait SessionRepository: Send + Sync {
    async fn create_session(&self, input: NewSession) -> Result<SessionRecord, DomainError>;
    async fn find_active(&self, id: &str, now: i64) -> Result<Option<SessionRecord>, DomainError>;
    async fn delete_session(&self, id: &str) -> Result<bool, DomainError>;
    async fn delete_expired(&self, now: i64) -> Result<u64, DomainError>;
}
