//! Toast-suppression rules and error-message keys
//!
//! Some endpoints handle their own error states inline (a registration
//! form rendering "email already exists" next to the field), so the
//! generic error toast must stay quiet for them. A static ordered rule
//! list decides, per `(request path, business error code)`, whether the
//! toast is withheld.

use once_cell::sync::Lazy;

/// Path side of a suppression rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// Matches every request path.
    Any,
    /// Matches one exact path.
    Exact(&'static str),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => *expected == path,
        }
    }
}

/// Code side of a suppression rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeMatch {
    /// Matches every error code, including an absent one.
    Any,
    /// Matches one exact code.
    Exact(&'static str),
    /// Matches any code in the list.
    OneOf(&'static [&'static str]),
}

impl CodeMatch {
    fn matches(&self, code: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => code == Some(*expected),
            Self::OneOf(expected) => code.is_some_and(|c| expected.contains(&c)),
        }
    }
}

/// One entry of the suppression table. A rule suppresses the toast when
/// both its path and code sides match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionRule {
    pub path: PathMatch,
    pub code: CodeMatch,
}

impl SuppressionRule {
    #[must_use]
    pub const fn new(path: PathMatch, code: CodeMatch) -> Self {
        Self { path, code }
    }

    /// Whether this rule matches the given request path and error code.
    #[must_use]
    pub fn matches(&self, path: &str, code: Option<&str>) -> bool {
        self.path.matches(path) && self.code.matches(code)
    }
}

/// Default suppression table for the merchant dashboard endpoints.
///
/// `/info` is polled in the background, so every error there stays silent;
/// the rest are form flows that surface the specific code inline.
pub static DEFAULT_RULES: Lazy<Vec<SuppressionRule>> = Lazy::new(|| {
    vec![
        SuppressionRule::new(PathMatch::Exact("/info"), CodeMatch::Any),
        SuppressionRule::new(PathMatch::Any, CodeMatch::Exact("REQUESTED")),
        SuppressionRule::new(PathMatch::Any, CodeMatch::Exact("FORGOT_PASSWORD_CODE_EXPIRED")),
        SuppressionRule::new(
            PathMatch::Any,
            CodeMatch::Exact("FORGOT_PASSWORD_LINK_ALREADY_USED"),
        ),
        SuppressionRule::new(PathMatch::Exact("/register"), CodeMatch::Exact("EMAIL_EXISTED")),
        SuppressionRule::new(
            PathMatch::Exact("/verify"),
            CodeMatch::OneOf(&["ACTIVE_CODE_EXPIRED", "USER_ACTIVATED"]),
        ),
        SuppressionRule::new(
            PathMatch::Exact("/change-password"),
            CodeMatch::Exact("MATCH_CURRENT_PASSWORD"),
        ),
        SuppressionRule::new(PathMatch::Exact("/login"), CodeMatch::Exact("NEED_TWO_FA")),
        SuppressionRule::new(PathMatch::Exact("/2fa/setup"), CodeMatch::Exact("UNAUTHORIZED")),
    ]
});

/// Whether a toast should be withheld for this `(path, code)` pair.
#[must_use]
pub fn is_suppressed(rules: &[SuppressionRule], path: &str, code: Option<&str>) -> bool {
    rules.iter().any(|rule| rule.matches(path, code))
}

/// Business error codes with a dedicated translation entry.
const KNOWN_CODES: &[&str] = &[
    "ACTIVE_CODE_EXPIRED",
    "EMAIL_EXISTED",
    "ADDRESS_EXISTED",
    "USER_ACTIVATED",
    "REQUESTED",
    "NOT_FOUND",
    "OLD_PASSWORD_NOT_MATCH",
    "NEED_TWO_FA",
    "MATCH_CURRENT_PASSWORD",
    "UNAUTHORIZED",
    "INVALID_CHAIN",
    "FORGOT_PASSWORD_CODE_EXPIRED",
    "FORGOT_PASSWORD_LINK_ALREADY_USED",
    "TOO_MANY_REQUESTS",
    "BLACKLISTED_ADDRESS",
];

/// Fallback translation key for codes without a dedicated entry.
pub const GENERAL_ERROR_KEY: &str = "errors.common.general";

/// Resolve the translation key for a business error code.
///
/// Known codes map to `errors.code.<CODE>`; unknown or absent codes fall
/// back to the generic message.
#[must_use]
pub fn message_key(code: Option<&str>) -> String {
    match code {
        Some(code) if KNOWN_CODES.contains(&code) => format!("errors.code.{code}"),
        _ => GENERAL_ERROR_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the suppression table.
    use super::*;

    #[test]
    fn register_email_existed_is_suppressed() {
        assert!(is_suppressed(&DEFAULT_RULES, "/register", Some("EMAIL_EXISTED")));
    }

    #[test]
    fn same_code_on_other_path_is_not_suppressed() {
        assert!(!is_suppressed(&DEFAULT_RULES, "/unknown", Some("EMAIL_EXISTED")));
    }

    #[test]
    fn wildcard_path_suppresses_everywhere() {
        assert!(is_suppressed(&DEFAULT_RULES, "/anything", Some("REQUESTED")));
        assert!(is_suppressed(&DEFAULT_RULES, "/login", Some("FORGOT_PASSWORD_CODE_EXPIRED")));
    }

    #[test]
    fn wildcard_code_suppresses_every_error_on_path() {
        assert!(is_suppressed(&DEFAULT_RULES, "/info", Some("ANYTHING_AT_ALL")));
        assert!(is_suppressed(&DEFAULT_RULES, "/info", None));
    }

    #[test]
    fn one_of_list_matches_each_member() {
        assert!(is_suppressed(&DEFAULT_RULES, "/verify", Some("ACTIVE_CODE_EXPIRED")));
        assert!(is_suppressed(&DEFAULT_RULES, "/verify", Some("USER_ACTIVATED")));
        assert!(!is_suppressed(&DEFAULT_RULES, "/verify", Some("EMAIL_EXISTED")));
    }

    #[test]
    fn missing_code_only_matches_wildcards() {
        assert!(!is_suppressed(&DEFAULT_RULES, "/register", None));
    }

    #[test]
    fn known_codes_get_dedicated_keys() {
        assert_eq!(message_key(Some("EMAIL_EXISTED")), "errors.code.EMAIL_EXISTED");
        assert_eq!(message_key(Some("TOO_MANY_REQUESTS")), "errors.code.TOO_MANY_REQUESTS");
    }

    #[test]
    fn unknown_codes_fall_back_to_general() {
        assert_eq!(message_key(Some("SOMETHING_NEW")), GENERAL_ERROR_KEY);
        assert_eq!(message_key(Some("TOKEN_EXPIRED")), GENERAL_ERROR_KEY);
        assert_eq!(message_key(None), GENERAL_ERROR_KEY);
    }
}
