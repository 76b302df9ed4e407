/*
 * Responsibility
 * - kuke-access-token / kuke-refresh-token の Set-Cookie 生成
 * - HttpOnly; Path=/; Max-Age=<validity seconds>; Secure/Domain は環境による
 */
use axum::http::header::{HeaderName, SET_COOKIE};
use axum::response::AppendHeaders;

pub const ACCESS_TOKEN_COOKIE: &str = "kuke-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "kuke-refresh-token";

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub domain: String,
    pub secure: bool,
}

/// One Set-Cookie value. `max_age` 0 clears the cookie.
fn cookie_value(name: &str, value: &str, max_age: i64, config: &CookieConfig) -> String {
    let mut cookie = format!("{name}={value}; Max-Age={max_age}; Path=/; HttpOnly");
    if config.secure {
        cookie.push_str("; Secure");
        cookie.push_str(&format!("; Domain={}", config.domain));
    }
    cookie
}

/// Headers attaching both token cookies to a login/refresh response. Token
/// values go out exactly as issued (type prefix included), matching what the
/// web client replays in the Authorization header.
pub fn token_cookies(
    access_token: &str,
    access_max_age: i64,
    refresh_token: &str,
    refresh_max_age: i64,
    config: &CookieConfig,
) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(vec![
        (
            SET_COOKIE,
            cookie_value(ACCESS_TOKEN_COOKIE, access_token, access_max_age, config),
        ),
        (
            SET_COOKIE,
            cookie_value(REFRESH_TOKEN_COOKIE, refresh_token, refresh_max_age, config),
        ),
    ])
}

/// Logout: empty values, Max-Age=0.
pub fn clear_token_cookies(config: &CookieConfig) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(vec![
        (SET_COOKIE, cookie_value(ACCESS_TOKEN_COOKIE, "", 0, config)),
        (SET_COOKIE, cookie_value(REFRESH_TOKEN_COOKIE, "", 0, config)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insecure_cookies_omit_secure_and_domain() {
        let config = CookieConfig {
            domain: String::new(),
            secure: false,
        };
        let value = cookie_value(ACCESS_TOKEN_COOKIE, "tok", 1800, &config);
        assert_eq!(value, "kuke-access-token=tok; Max-Age=1800; Path=/; HttpOnly");
    }

    #[test]
    fn secure_cookies_carry_domain() {
        let config = CookieConfig {
            domain: "kukemeet.com".into(),
            secure: true,
        };
        let value = cookie_value(REFRESH_TOKEN_COOKIE, "tok", 604800, &config);
        assert_eq!(
            value,
            "kuke-refresh-token=tok; Max-Age=604800; Path=/; HttpOnly; Secure; Domain=kukemeet.com"
        );
    }

    #[test]
    fn clearing_uses_empty_value_and_zero_max_age() {
        let config = CookieConfig {
            domain: String::new(),
            secure: false,
        };
        let value = cookie_value(ACCESS_TOKEN_COOKIE, "", 0, &config);
        assert!(value.starts_with("kuke-access-token=; Max-Age=0;"));
    }
}
