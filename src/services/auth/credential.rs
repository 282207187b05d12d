//! Credential extraction from request headers.
//!
//! Two sources exist: the `Authorization` header (`<scheme> <token>`) and, in session
//! mode, a named cookie field. Nothing here verifies anything.
use axum::http::{HeaderMap, header};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Bearer,
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

/// Outcome of looking at the Authorization value.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthorizationValue<'a> {
    Absent,
    /// Present, but not `<scheme> <token>` or not readable as text.
    Malformed,
    Token(&'a str),
}

/// Reads `Authorization` (header lookup is case-insensitive).
///
/// `fallback` is a value the caller already pulled out of the request, such as a gateway
/// `authorizationToken`. It is consulted when the header is missing or blank.
pub fn authorization_value<'a>(
    headers: &'a HeaderMap,
    fallback: Option<&'a str>,
) -> AuthorizationValue<'a> {
    let header_value = match headers.get(header::AUTHORIZATION).map(|value| value.to_str()) {
        Some(Ok(s)) => Some(s),
        Some(Err(_)) => return AuthorizationValue::Malformed,
        None => None,
    };

    let Some(raw) = header_value
        .filter(|s| !s.trim().is_empty())
        .or(fallback)
        .filter(|s| !s.trim().is_empty())
    else {
        return AuthorizationValue::Absent;
    };

    // scheme is not checked, the second whitespace-separated token is the credential
    match raw.split_whitespace().nth(1) {
        Some(token) => AuthorizationValue::Token(token),
        None => AuthorizationValue::Malformed,
    }
}

/// Finds `name` among the request cookies.
///
/// Pairs are split on `;` and the name must match exactly, so `x__session=` does not
/// satisfy `__session`. The value runs up to the next `;` or the end of the header.
pub fn session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_token_is_second_whitespace_token() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(
            authorization_value(&h, None),
            AuthorizationValue::Token("abc.def.ghi")
        );
    }

    #[test]
    fn lowercase_header_name_is_found() {
        let mut h = HeaderMap::new();
        h.insert("authorization", HeaderValue::from_static("bearer tok"));
        assert_eq!(authorization_value(&h, None), AuthorizationValue::Token("tok"));
    }

    #[test]
    fn missing_or_blank_header_is_absent() {
        assert_eq!(
            authorization_value(&HeaderMap::new(), None),
            AuthorizationValue::Absent
        );
        let h = headers(&[(header::AUTHORIZATION, "   ")]);
        assert_eq!(authorization_value(&h, None), AuthorizationValue::Absent);
    }

    #[test]
    fn single_token_header_is_malformed() {
        let h = headers(&[(header::AUTHORIZATION, "abc.def.ghi")]);
        assert_eq!(authorization_value(&h, None), AuthorizationValue::Malformed);
    }

    #[test]
    fn fallback_is_used_only_without_header() {
        assert_eq!(
            authorization_value(&HeaderMap::new(), Some("Bearer from-event")),
            AuthorizationValue::Token("from-event")
        );
        let h = headers(&[(header::AUTHORIZATION, "Bearer from-header")]);
        assert_eq!(
            authorization_value(&h, Some("Bearer from-event")),
            AuthorizationValue::Token("from-header")
        );
    }

    #[test]
    fn blank_header_falls_back_to_gateway_token() {
        let h = headers(&[(header::AUTHORIZATION, "  ")]);
        assert_eq!(
            authorization_value(&h, Some("Bearer from-event")),
            AuthorizationValue::Token("from-event")
        );
        assert_eq!(authorization_value(&h, Some(" ")), AuthorizationValue::Absent);
    }

    #[test]
    fn session_cookie_value_stops_at_delimiter() {
        let h = headers(&[(header::COOKIE, "__session=abc123; other=1")]);
        assert_eq!(session_cookie(&h, "__session"), Some("abc123"));
    }

    #[test]
    fn session_cookie_requires_exact_name() {
        let h = headers(&[(header::COOKIE, "x__session=nope; __session_old=nope")]);
        assert_eq!(session_cookie(&h, "__session"), None);

        let h = headers(&[(header::COOKIE, "a=1; __session=last")]);
        assert_eq!(session_cookie(&h, "__session"), Some("last"));
    }

    #[test]
    fn session_cookie_is_searched_across_cookie_headers() {
        let h = headers(&[(header::COOKIE, "a=1"), (header::COOKIE, "__session=second")]);
        assert_eq!(session_cookie(&h, "__session"), Some("second"));
    }

    #[test]
    fn empty_session_value_counts_as_absent() {
        let h = headers(&[(header::COOKIE, "__session=; a=1")]);
        assert_eq!(session_cookie(&h, "__session"), None);
    }

    #[test]
    fn empty_duplicate_session_is_skipped() {
        let h = headers(&[(header::COOKIE, "__session=; __session=abc")]);
        assert_eq!(session_cookie(&h, "__session"), Some("abc"));

        let h = headers(&[(header::COOKIE, "__session="), (header::COOKIE, "__session=def")]);
        assert_eq!(session_cookie(&h, "__session"), Some("def"));
    }
}
