/*
 * Responsibility
 * - Friends の response DTO
 */
use serde::Serialize;

use crate::repos::friend_repo::FriendRow;

#[derive(Debug, Serialize)]
pub struct FriendResponse {
    pub friend_id: i64,
    pub nickname: String,
    pub username: String,
}

impl From<FriendRow> for FriendResponse {
    fn from(row: FriendRow) -> Self {
        Self {
            friend_id: row.friend_id,
            nickname: row.nickname,
            username: row.username,
        }
    }
}
