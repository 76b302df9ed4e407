// Responsibility
// - access matrix の拒否リダイレクト先 (/exception/*)
// - ここで初めて JSON の error body になる（middleware 自体は redirect のみ）
use crate::error::AppError;

pub async fn entry_point() -> AppError {
    AppError::Unauthorized
}

pub async fn access_denied() -> AppError {
    AppError::Forbidden
}
