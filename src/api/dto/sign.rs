/*
 * Responsibility
 * - Sign 系の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub uid: String,
    pub password: String,
    pub username: String,
    pub nickname: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.uid.trim().is_empty() {
            return Err("uid is required");
        }
        if self.password.len() < 8 {
            return Err("password must be >= 8 chars");
        }
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.nickname.trim().is_empty() || self.nickname.len() > 30 {
            return Err("nickname must be 1..=30 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub uid: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.uid.trim().is_empty() || self.password.is_empty() {
            return Err("uid and password are required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderLoginRequest {
    pub provider: String,
    // Identity on the provider's side, not ours.
    pub uid: String,
}

impl ProviderLoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.provider.trim().is_empty() || self.uid.trim().is_empty() {
            return Err("provider and uid are required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderRegisterRequest {
    pub provider: String,
    pub uid: String,
    pub username: String,
    pub nickname: String,
}

impl ProviderRegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.provider.trim().is_empty() || self.uid.trim().is_empty() {
            return Err("provider and uid are required");
        }
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.nickname.trim().is_empty() || self.nickname.len() > 30 {
            return Err("nickname must be 1..=30 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.new_password.len() < 8 {
            return Err("new_password must be >= 8 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_short_passwords() {
        let req = RegisterRequest {
            uid: "user@kukemeet.com".into(),
            password: "short".into(),
            username: "user".into(),
            nickname: "nick".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn register_accepts_a_complete_request() {
        let req = RegisterRequest {
            uid: "user@kukemeet.com".into(),
            password: "long enough".into(),
            username: "user".into(),
            nickname: "nick".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn provider_login_requires_both_fields() {
        let req = ProviderLoginRequest {
            provider: "kakao".into(),
            uid: "".into(),
        };
        assert!(req.validate().is_err());
    }
}
