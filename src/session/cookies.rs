//! Cookie construction and parsing for the credential pair.

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};

/// Name of the HTTP-only session credential cookie.
pub const SESSION_COOKIE: &str = "session";
/// Name of the script-readable CSRF secret cookie.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Builds the credential cookies with the transport asymmetry the
/// double-submit defense depends on: the session credential is
/// HTTP-only, the CSRF secret is readable so the client can echo it
/// back in a header. Both are Secure and SameSite=Lax.
#[derive(Clone)]
pub struct CookieFactory {
    secure: bool,
    max_age_secs: u64,
}

impl CookieFactory {
    pub fn new(secure: bool, max_age_secs: u64) -> Self {
        Self {
            secure,
            max_age_secs,
        }
    }

    /// Session credential cookie.
    pub fn session(&self, token: &str) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_owned()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.max_age_secs as i64))
            .path("/")
            .build()
    }

    /// CSRF secret cookie. Not HTTP-only.
    pub fn csrf(&self, secret: &str) -> Cookie<'static> {
        Cookie::build((CSRF_COOKIE, secret.to_owned()))
            .http_only(false)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.max_age_secs as i64))
            .path("/")
            .build()
    }

    /// Expired cookie that instructs the client to drop `name`.
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build((name, ""))
            .path("/")
            .max_age(CookieDuration::ZERO)
            .build()
    }
}

/// Read a cookie value out of a request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get_all(header::COOKIE).iter().find_map(|value| {
        let raw = value.to_str().ok()?;
        Cookie::split_parse(raw).find_map(|parsed| {
            let cookie = parsed.ok()?;
            (cookie.name() == name).then(|| cookie.value().to_string())
        })
    })
}

/// Append a `Set-Cookie` header to a response's header map.
pub fn append_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.append(header::SET_COOKIE, value);
    }
}
