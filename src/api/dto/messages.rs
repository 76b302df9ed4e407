/*
 * Responsibility
 * - Messages の request/response DTO
 * - keyset pagination 用のクエリ (last_message_id / limit)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::message_repo::MessageRow;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    pub content: String,
}

impl SendMessageRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        if self.content.len() > 1000 {
            return Err("content must be <= 1000 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagePageQuery {
    pub last_message_id: Option<i64>,
    pub limit: Option<i64>,
}

impl MessagePageQuery {
    const DEFAULT_LIMIT: i64 = 20;
    const MAX_LIMIT: i64 = 100;

    /// Missing cursor means "from the newest".
    pub fn last_message_id(&self) -> i64 {
        self.last_message_id.unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub sender_id: i64,
    pub sender_nickname: String,
    pub receiver_id: i64,
    pub receiver_nickname: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for MessageResponse {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            sender_nickname: row.sender_nickname,
            receiver_id: row.receiver_id,
            receiver_nickname: row.receiver_nickname,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        let q = MessagePageQuery {
            last_message_id: None,
            limit: None,
        };
        assert_eq!(q.last_message_id(), i64::MAX);
        assert_eq!(q.limit(), 20);

        let q = MessagePageQuery {
            last_message_id: Some(50),
            limit: Some(1000),
        };
        assert_eq!(q.last_message_id(), 50);
        assert_eq!(q.limit(), 100);
    }

    #[test]
    fn blank_content_is_rejected() {
        let req = SendMessageRequest {
            receiver_id: 2,
            content: "   ".into(),
        };
        assert!(req.validate().is_err());
    }
}
