/*
 * Responsibility
 * - rooms テーブル向け SQLx 操作
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct RoomRow {
    #[sqlx(rename = "roomId")]
    pub id: i64,
    pub title: String,
    #[sqlx(rename = "ownerId")]
    pub owner_id: i64,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub async fn list(db: &PgPool) -> Result<Vec<RoomRow>, RepoError> {
    let rows = sqlx::query_as::<_, RoomRow>(
        r#"
        SELECT "roomId", "title", "ownerId", "createdAt"
        FROM rooms
        ORDER BY "createdAt" DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, room_id: i64) -> Result<Option<RoomRow>, RepoError> {
    let row = sqlx::query_as::<_, RoomRow>(
        r#"
        SELECT "roomId", "title", "ownerId", "createdAt"
        FROM rooms
        WHERE "roomId" = $1
        "#,
    )
    .bind(room_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, owner_id: i64, title: &str) -> Result<RoomRow, RepoError> {
    let row = sqlx::query_as::<_, RoomRow>(
        r#"
        INSERT INTO rooms ("ownerId", "title")
        VALUES ($1, $2)
        RETURNING "roomId", "title", "ownerId", "createdAt"
        "#,
    )
    .bind(owner_id)
    .bind(title)
    .fetch_one(db)
    .await?;

    Ok(row)
}
