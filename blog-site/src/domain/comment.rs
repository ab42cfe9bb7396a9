use serde::{Deserialize, Serialize};

use super::error::DomainError;

const TEXT_MAX_CHARS: usize = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) author_email: String,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) text: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let text = self.text.trim();
        if text.is_empty() || text.chars().count() > TEXT_MAX_CHARS {
            return Err(DomainError::Validation {
                field: "text",
                message: "must be 1..5000 chars",
            });
        }
        Ok(Self {
            text: text.to_string(),
        })
    }
}
