/*
 * Responsibility
 * - Rooms の request/response DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::room_repo::RoomRow;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub title: String,
}

impl CreateRoomRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.len() > 100 {
            return Err("title must be <= 100 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<RoomRow> for RoomResponse {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}
