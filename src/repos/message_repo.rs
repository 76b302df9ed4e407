/*
 * Responsibility
 * - messages テーブル向け SQLx 操作
 * - sent/received の keyset pagination (lastMessageId より古いものを limit 件)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct MessageRow {
    #[sqlx(rename = "messageId")]
    pub id: i64,
    #[sqlx(rename = "senderId")]
    pub sender_id: i64,
    #[sqlx(rename = "senderNickname")]
    pub sender_nickname: String,
    #[sqlx(rename = "receiverId")]
    pub receiver_id: i64,
    #[sqlx(rename = "receiverNickname")]
    pub receiver_nickname: String,
    pub content: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

const MESSAGE_SELECT: &str = r#"
    SELECT m."messageId", m."senderId", s."nickname" AS "senderNickname",
           m."receiverId", r."nickname" AS "receiverNickname",
           m."content", m."createdAt"
    FROM messages m
    JOIN users s ON s."userId" = m."senderId"
    JOIN users r ON r."userId" = m."receiverId"
"#;

pub async fn create(
    db: &PgPool,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
) -> Result<MessageRow, RepoError> {
    let (message_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO messages ("senderId", "receiverId", "content")
        VALUES ($1, $2, $3)
        RETURNING "messageId"
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .fetch_one(db)
    .await?;

    let row = sqlx::query_as::<_, MessageRow>(&format!(
        r#"{MESSAGE_SELECT} WHERE m."messageId" = $1"#,
    ))
    .bind(message_id)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// Messages sent by `user_id`, strictly older than `last_message_id`, newest first.
pub async fn sent(
    db: &PgPool,
    user_id: i64,
    last_message_id: i64,
    limit: i64,
) -> Result<Vec<MessageRow>, RepoError> {
    let rows = sqlx::query_as::<_, MessageRow>(&format!(
        r#"
        {MESSAGE_SELECT}
        WHERE m."senderId" = $1 AND m."messageId" < $2
        ORDER BY m."messageId" DESC
        LIMIT $3
        "#,
    ))
    .bind(user_id)
    .bind(last_message_id)
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn received(
    db: &PgPool,
    user_id: i64,
    last_message_id: i64,
    limit: i64,
) -> Result<Vec<MessageRow>, RepoError> {
    let rows = sqlx::query_as::<_, MessageRow>(&format!(
        r#"
        {MESSAGE_SELECT}
        WHERE m."receiverId" = $1 AND m."messageId" < $2
        ORDER BY m."messageId" DESC
        LIMIT $3
        "#,
    ))
    .bind(user_id)
    .bind(last_message_id)
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Only the sender may delete their message.
pub async fn delete(db: &PgPool, message_id: i64, sender_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE "messageId" = $1 AND "senderId" = $2
        "#,
    )
    .bind(message_id)
    .bind(sender_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
