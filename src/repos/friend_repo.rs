/*
 * Responsibility
 * - friends テーブル向け SQLx 操作
 * - (userId, friendId) の複合キー、片方向の関係として保存
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct FriendRow {
    #[sqlx(rename = "friendId")]
    pub friend_id: i64,
    pub nickname: String,
    pub username: String,
}

/// Friends of `user_id`, joined with the friend's public profile.
pub async fn list_for_user(db: &PgPool, user_id: i64) -> Result<Vec<FriendRow>, RepoError> {
    let rows = sqlx::query_as::<_, FriendRow>(
        r#"
        SELECT f."friendId", u."nickname", u."username"
        FROM friends f
        JOIN users u ON u."userId" = f."friendId"
        WHERE f."userId" = $1
        ORDER BY u."nickname"
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn add(db: &PgPool, user_id: i64, friend_id: i64) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        INSERT INTO friends ("userId", "friendId")
        VALUES ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(friend_id)
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(())
}

pub async fn remove(db: &PgPool, user_id: i64, friend_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM friends
        WHERE "userId" = $1 AND "friendId" = $2
        "#,
    )
    .bind(user_id)
    .bind(friend_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
