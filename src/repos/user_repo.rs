/*
 * Responsibility
 * - users / user_roles テーブル向け SQLx 操作
 * - PgPool を受け取り CRUD を提供
 * - DB エラーは RepoError/AppError に変換しやすい形で返す
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: i64,
    pub uid: String,
    // NULL for social-login users
    pub password: Option<String>,
    pub username: String,
    pub nickname: String,
    pub provider: Option<String>,
    #[sqlx(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

const USER_COLUMNS: &str =
    r#""userId", "uid", "password", "username", "nickname", "provider", "refreshToken""#;

/// Insert a user together with the default NORMAL role, atomically.
pub async fn create(
    db: &PgPool,
    uid: &str,
    password: Option<&str>,
    username: &str,
    nickname: &str,
    provider: Option<&str>,
) -> Result<UserRow, RepoError> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users ("uid", "password", "username", "nickname", "provider")
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(uid)
    .bind(password)
    .bind(username)
    .bind(nickname)
    .bind(provider)
    .fetch_one(&mut *tx)
    .await
    .map_err(RepoError::from_sqlx)?;

    sqlx::query(
        r#"
        INSERT INTO user_roles ("userId", "role")
        VALUES ($1, 'NORMAL')
        "#,
    )
    .bind(row.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(row)
}

pub async fn find_by_id(db: &PgPool, user_id: i64) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE "userId" = $1
        "#,
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_uid(db: &PgPool, uid: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE "uid" = $1
        "#,
    ))
    .bind(uid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_provider_uid(
    db: &PgPool,
    provider: &str,
    uid: &str,
) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE "provider" = $1 AND "uid" = $2
        "#,
    ))
    .bind(provider)
    .bind(uid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_nickname(db: &PgPool, nickname: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE "nickname" = $1
        "#,
    ))
    .bind(nickname)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Roles attached to a user, alphabetical for stable output.
pub async fn roles(db: &PgPool, user_id: i64) -> Result<Vec<String>, RepoError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT "role"
        FROM user_roles
        WHERE "userId" = $1
        ORDER BY "role"
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(|(r,)| r).collect())
}

/// Listing/search. `nickname` filters by prefix when present.
pub async fn search(db: &PgPool, nickname: Option<&str>) -> Result<Vec<UserRow>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE $1::text IS NULL OR "nickname" LIKE $1 || '%'
        ORDER BY "createdAt" DESC
        "#,
    ))
    .bind(nickname)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    user_id: i64,
    username: Option<&str>,
    nickname: Option<&str>,
) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET
            "username" = COALESCE($2, "username"),
            "nickname" = COALESCE($3, "nickname")
        WHERE "userId" = $1
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(username)
    .bind(nickname)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// `None` clears the stored refresh token (logout).
pub async fn set_refresh_token(
    db: &PgPool,
    user_id: i64,
    refresh_token: Option<&str>,
) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        UPDATE users
        SET "refreshToken" = $2
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .bind(refresh_token)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn set_password(db: &PgPool, user_id: i64, password: &str) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        UPDATE users
        SET "password" = $2
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .bind(password)
    .execute(db)
    .await?;

    Ok(())
}
