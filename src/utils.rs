use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE},
};

/// Adds security headers to every response
pub fn add_security_headers(headers: &mut HeaderMap, is_https: bool) {
    // Pages are static HTML without scripts
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'none'; object-src 'none'; frame-ancestors 'none';",
        ),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=(), payment=()"),
    );

    // HSTS only when the request arrived over HTTPS
    if is_https {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
}

/// True when a proxy in front of us terminated TLS
pub fn is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Value of the named cookie, if the request carries it
pub fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|value| value.trim_matches('"').to_string())
}

/// Token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// `Set-Cookie` value carrying a fresh credential
pub fn build_token_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the credential
pub fn clear_token_cookie(name: &str, secure: bool) -> String {
    build_token_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_extract_cookie() {
        let map = headers(&[("cookie", "theme=dark; token=abc.def.ghi; other=1")]);
        assert_eq!(extract_cookie(&map, "token"), Some("abc.def.ghi".to_string()));
        assert_eq!(extract_cookie(&map, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_does_not_match_suffix() {
        let map = headers(&[("cookie", "csrf_token=nope")]);
        assert_eq!(extract_cookie(&map, "token"), None);
    }

    #[test]
    fn test_extract_cookie_across_headers() {
        let map = headers(&[("cookie", "a=1"), ("cookie", "token=xyz")]);
        assert_eq!(extract_cookie(&map, "token"), Some("xyz".to_string()));
    }

    #[test]
    fn test_extract_bearer() {
        let map = headers(&[("authorization", "Bearer abc")]);
        assert_eq!(extract_bearer(&map), Some("abc".to_string()));

        let map = headers(&[("authorization", "Basic YWRtaW4=")]);
        assert_eq!(extract_bearer(&map), None);

        let map = headers(&[("authorization", "Bearer    ")]);
        assert_eq!(extract_bearer(&map), None);
    }

    #[test]
    fn test_token_cookie_flags() {
        let cookie = build_token_cookie("token", "abc", 28800, true);
        assert_eq!(
            cookie,
            "token=abc; Max-Age=28800; Path=/; HttpOnly; SameSite=Lax; Secure"
        );

        let cleared = clear_token_cookie("token", false);
        assert_eq!(cleared, "token=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax");
    }

    #[test]
    fn test_security_headers() {
        let mut map = HeaderMap::new();
        add_security_headers(&mut map, false);
        assert_eq!(map.get("x-frame-options").unwrap(), "DENY");
        assert!(map.get("strict-transport-security").is_none());

        add_security_headers(&mut map, true);
        assert!(map.get("strict-transport-security").is_some());
    }
}
