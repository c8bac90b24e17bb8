//! services/api/src/web/session.rs
//!
//! Per-role session settings and the session cookie itself.

use axum::http::{header, HeaderMap};
use portal_core::{Principal, Role};

use crate::web::token::SESSION_TTL_SECS;

/// Which cookie carries a role's session and which collection resolves it.
/// One value per role is handed to the shared guard and auth handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub role: Role,
    pub cookie_name: &'static str,
}

impl SessionPolicy {
    pub const ADMIN: SessionPolicy = SessionPolicy {
        role: Role::Admin,
        cookie_name: "adminToken",
    };
    pub const INSTRUCTOR: SessionPolicy = SessionPolicy {
        role: Role::Instructor,
        cookie_name: "instructorToken",
    };
    pub const STUDENT: SessionPolicy = SessionPolicy {
        role: Role::Student,
        cookie_name: "studentToken",
    };

    /// `Set-Cookie` value carrying a fresh token.
    pub fn session_cookie(&self, token: &str, secure: bool) -> String {
        self.cookie(token, SESSION_TTL_SECS, secure)
    }

    /// `Set-Cookie` value that makes the browser drop the session.
    pub fn cleared_cookie(&self, secure: bool) -> String {
        self.cookie("", 0, secure)
    }

    fn cookie(&self, value: &str, max_age: i64, secure: bool) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.cookie_name, value, max_age
        );
        if secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Reads this role's token out of the request's `Cookie` headers.
    pub fn token_from<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .find_map(|c| {
                c.trim()
                    .strip_prefix(self.cookie_name)
                    .and_then(|rest| rest.strip_prefix('='))
            })
            .filter(|token| !token.is_empty())
    }
}

/// The principal resolved by the session guard, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);
