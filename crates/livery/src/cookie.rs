//! Theme cookie reading and writing.

use std::fmt;

use http::header::COOKIE;
use http::HeaderMap;

/// The `Set-Cookie` value that persists an explicit theme choice.
///
/// ```rust
/// use livery::ThemeCookie;
///
/// let cookie = ThemeCookie::new("theme", "dark");
/// assert_eq!(cookie.to_string(), "theme=dark; Path=/; HttpOnly; SameSite=Lax");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCookie {
    name: String,
    value: String,
}

impl ThemeCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the name is a cookie token and the value is made of cookie
    /// octets (RFC 6265, section 4.1.1).
    ///
    /// Invalid cookies are never sent.
    ///
    /// ```rust
    /// use livery::ThemeCookie;
    ///
    /// assert!(ThemeCookie::new("theme", "dark-blue").is_valid());
    /// assert!(!ThemeCookie::new("theme", "dark; Domain=evil").is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && self.name.bytes().all(is_token_byte)
            && self.value.bytes().all(is_cookie_octet)
    }
}

fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&byte)
}

fn is_cookie_octet(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

impl fmt::Display for ThemeCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, self.value
        )
    }
}

/// Returns the value of cookie `name` from the request's `Cookie` headers.
///
/// Every `Cookie` header is searched; the first match wins. Values are
/// returned as sent, without surrounding whitespace.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_display_format() {
        let cookie = ThemeCookie::new("skin", "midnight");
        assert_eq!(
            cookie.to_string(),
            "skin=midnight; Path=/; HttpOnly; SameSite=Lax"
        );
        assert_eq!(cookie.name(), "skin");
        assert_eq!(cookie.value(), "midnight");
    }

    #[test]
    fn test_validity() {
        assert!(ThemeCookie::new("theme", "dark").is_valid());
        assert!(ThemeCookie::new("theme", "").is_valid());
        assert!(ThemeCookie::new("skin_pref", "v2.1-blue").is_valid());

        assert!(!ThemeCookie::new("theme", "a;b").is_valid());
        assert!(!ThemeCookie::new("theme", "a,b").is_valid());
        assert!(!ThemeCookie::new("theme", "dark mode").is_valid());
        assert!(!ThemeCookie::new("theme", "\"quoted\"").is_valid());
        assert!(!ThemeCookie::new("theme", "caf\u{e9}").is_valid());
        assert!(!ThemeCookie::new("", "dark").is_valid());
        assert!(!ThemeCookie::new("the=me", "dark").is_valid());
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=abc; theme=dark ;x=1"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "session"), Some("abc"));
        assert_eq!(cookie_value(&headers, "them"), None);
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("theme=light"));
        assert_eq!(cookie_value(&headers, "theme"), Some("light"));
    }

    #[test]
    fn test_cookie_without_value_pair_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("flag; theme="));
        assert_eq!(cookie_value(&headers, "flag"), None);
        assert_eq!(cookie_value(&headers, "theme"), Some(""));
    }
}
