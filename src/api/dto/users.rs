/*
 * Responsibility
 * - Users の request/response DTO
 */
use serde::{Deserialize, Serialize};

use crate::repos::user_repo::UserRow;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub nickname: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.username
            && name.trim().is_empty()
        {
            return Err("username cannot be empty");
        }
        if let Some(nick) = &self.nickname
            && (nick.trim().is_empty() || nick.len() > 30)
        {
            return Err("nickname must be 1..=30 chars");
        }
        Ok(())
    }
}

/// Public view of a user; never exposes uid/password/refresh token.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub nickname: String,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            nickname: row.nickname,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_blank_fields() {
        let req = UpdateUserRequest {
            username: Some("  ".into()),
            nickname: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_with_no_fields_is_valid() {
        let req = UpdateUserRequest {
            username: None,
            nickname: None,
        };
        assert!(req.validate().is_ok());
    }
}
