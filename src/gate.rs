// ============================================================================
// Access Gate
// ============================================================================
//
// Decides, per request, whether a caller may reach a page:
//
//   route      | valid token         | no / invalid token
//   -----------+---------------------+-------------------
//   /          | RedirectToProtected | RedirectToLogin
//   /login     | RedirectToProtected | Allow
//   /summary   | Allow               | RedirectToLogin
//
// Any other path is not gated. The decision is a pure function of the route
// and credential validity; the axum middleware in routes::middleware turns it
// into a response.
//
// ============================================================================

use std::fmt;

use crate::auth::AuthManager;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const PROTECTED_PATH: &str = "/summary";

/// Paths the gate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Protected,
}

impl Route {
    /// Map a request path to a gated route, `None` if the path is not gated
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            ROOT_PATH => Some(Route::Root),
            LOGIN_PATH => Some(Route::Login),
            PROTECTED_PATH => Some(Route::Protected),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => ROOT_PATH,
            Route::Login => LOGIN_PATH,
            Route::Protected => PROTECTED_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToProtected,
}

impl GateDecision {
    /// Redirect target, `None` when the request may proceed
    pub fn location(&self) -> Option<&'static str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin => Some(LOGIN_PATH),
            GateDecision::RedirectToProtected => Some(PROTECTED_PATH),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::Allow => "allow",
            GateDecision::RedirectToLogin => "redirect_to_login",
            GateDecision::RedirectToProtected => "redirect_to_protected",
        }
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can tell a good credential from a bad one.
///
/// Implementations must fail closed: errors of any kind answer `false`.
pub trait TokenVerifier {
    fn is_valid(&self, token: &str) -> bool;
}

impl TokenVerifier for AuthManager {
    fn is_valid(&self, token: &str) -> bool {
        AuthManager::is_valid(self, token)
    }
}

/// The decision table
pub fn decide(route: Route, token_valid: bool) -> GateDecision {
    match (route, token_valid) {
        (Route::Root, true) => GateDecision::RedirectToProtected,
        (Route::Root, false) => GateDecision::RedirectToLogin,
        (Route::Login, true) => GateDecision::RedirectToProtected,
        (Route::Login, false) => GateDecision::Allow,
        (Route::Protected, true) => GateDecision::Allow,
        (Route::Protected, false) => GateDecision::RedirectToLogin,
    }
}

/// Classify a raw credential; absent and empty tokens are invalid
pub fn token_is_valid<V: TokenVerifier + ?Sized>(raw_token: Option<&str>, verifier: &V) -> bool {
    match raw_token.map(str::trim) {
        Some(token) if !token.is_empty() => verifier.is_valid(token),
        _ => false,
    }
}

/// Full gate evaluation for a request path.
///
/// Returns `None` for paths outside the gated set (pass-through).
pub fn evaluate<V: TokenVerifier + ?Sized>(
    path: &str,
    raw_token: Option<&str>,
    verifier: &V,
) -> Option<GateDecision> {
    let route = Route::from_path(path)?;
    Some(decide(route, token_is_valid(raw_token, verifier)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVerifier(&'static str);

    impl TokenVerifier for FixedVerifier {
        fn is_valid(&self, token: &str) -> bool {
            token == self.0
        }
    }

    #[test]
    fn test_decision_table() {
        let cases = [
            (Route::Root, true, GateDecision::RedirectToProtected),
            (Route::Root, false, GateDecision::RedirectToLogin),
            (Route::Login, true, GateDecision::RedirectToProtected),
            (Route::Login, false, GateDecision::Allow),
            (Route::Protected, true, GateDecision::Allow),
            (Route::Protected, false, GateDecision::RedirectToLogin),
        ];

        for (route, valid, expected) in cases {
            assert_eq!(decide(route, valid), expected, "{:?} valid={}", route, valid);
        }
    }

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Root));
        assert_eq!(Route::from_path("/login"), Some(Route::Login));
        assert_eq!(Route::from_path("/summary"), Some(Route::Protected));
        assert_eq!(Route::from_path("/summary/"), None);
        assert_eq!(Route::from_path("/api/login"), None);
        assert_eq!(Route::from_path("/health"), None);
    }

    #[test]
    fn test_route_path_round_trips() {
        for route in [Route::Root, Route::Login, Route::Protected] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_redirect_locations() {
        assert_eq!(GateDecision::Allow.location(), None);
        assert_eq!(GateDecision::RedirectToLogin.location(), Some("/login"));
        assert_eq!(GateDecision::RedirectToProtected.location(), Some("/summary"));
    }

    #[test]
    fn test_evaluate_login_page() {
        let verifier = FixedVerifier("good");
        assert_eq!(
            evaluate("/login", Some("good"), &verifier),
            Some(GateDecision::RedirectToProtected)
        );
        assert_eq!(evaluate("/login", None, &verifier), Some(GateDecision::Allow));
    }

    #[test]
    fn test_evaluate_absent_and_blank_tokens_are_invalid() {
        let verifier = FixedVerifier("");
        assert_eq!(
            evaluate("/summary", Some("   "), &verifier),
            Some(GateDecision::RedirectToLogin)
        );
        assert_eq!(
            evaluate("/summary", None, &verifier),
            Some(GateDecision::RedirectToLogin)
        );
    }

    #[test]
    fn test_evaluate_ungated_path_passes_through() {
        let verifier = FixedVerifier("good");
        assert_eq!(evaluate("/metrics", None, &verifier), None);
        assert_eq!(evaluate("/api/summary", Some("bad"), &verifier), None);
    }

    #[test]
    fn test_evaluate_with_auth_manager() {
        let manager =
            AuthManager::from_secret("test_secret_at_least_32_characters_long", "iss", 60)
                .unwrap();
        let token = manager.create_token("admin").unwrap().token;

        assert_eq!(
            evaluate("/", Some(token.as_str()), &manager),
            Some(GateDecision::RedirectToProtected)
        );
        assert_eq!(
            evaluate("/summary", Some("garbage.token.value"), &manager),
            Some(GateDecision::RedirectToLogin)
        );
    }
}
