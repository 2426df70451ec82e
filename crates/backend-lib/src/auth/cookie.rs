//! The session cookie: the only place a token travels between browser and server.
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::{DateTime, Utc};

use super::Session;

pub const DEFAULT_COOKIE_NAME: &str = "spice_paradise_session";

/// `Expires` attribute format (RFC 7231 IMF-fixdate)
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Name and attributes of the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME, false)
    }
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying `session`'s token until it expires
    pub fn issue(&self, session: &Session) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(&session.token, session.expires_at, None)
    }

    /// `Set-Cookie` value that makes the browser drop the cookie
    pub fn clear(&self) -> HeaderValue {
        // name comes from validated config and everything else is fixed text
        self.build("", DateTime::<Utc>::UNIX_EPOCH, Some(0))
            .unwrap_or_else(|_| HeaderValue::from_static("Max-Age=0"))
    }

    fn build(
        &self,
        value: &str,
        expires: DateTime<Utc>,
        max_age: Option<i64>,
    ) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Expires={}",
            self.name,
            value,
            expires.format(HTTP_DATE)
        );
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    /// Pull the token out of the request's `Cookie` headers
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == self.name)
            .map(|(_, val)| val.trim().to_string())
            .filter(|val| !val.is_empty())
    }
}

/// Whether `name` can be used as a cookie name (RFC 6265 token)
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"'
                        | b'/' | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> Session {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        Session {
            token: "tok_abc-123".to_string(),
            user_id: 1,
            username: "alice".to_string(),
            created_at,
            expires_at: created_at + chrono::TimeDelta::hours(24),
        }
    }

    #[test]
    fn test_issue_sets_attributes() {
        let cookie = SessionCookie::default().issue(&session()).unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("spice_paradise_session=tok_abc-123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Expires=Mon, 02 Mar 2026 10:00:00 GMT"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_flag() {
        let cookie = SessionCookie::new("sid", true).issue(&session()).unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_expires_immediately() {
        let cookie = SessionCookie::default().clear();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("spice_paradise_session=;"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_among_other_cookies() {
        let jar = SessionCookie::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; spice_paradise_session=abc; lang=en"),
        );
        assert_eq!(jar.extract(&headers).as_deref(), Some("abc"));

        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("spice_paradise_session=xyz"));
        assert_eq!(jar.extract(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_missing_or_empty() {
        let jar = SessionCookie::default();
        assert_eq!(jar.extract(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("spice_paradise_session="));
        assert_eq!(jar.extract(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("spice_paradise_session_old=abc"));
        assert_eq!(jar.extract(&headers), None);
    }

    #[test]
    fn test_cookie_names() {
        assert!(is_valid_cookie_name("spice_paradise_session"));
        assert!(!is_valid_cookie_name(""));
        assert!(!is_valid_cookie_name("bad name"));
        assert!(!is_valid_cookie_name("a=b"));
    }
}
