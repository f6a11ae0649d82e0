//! Environment variable names and `${VAR}` expansion.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Path of an optional TOML config file.
pub const EXPORT_CONFIG: &str = "EXPORT_CONFIG";
/// Minimum borrowed USD for a candidate.
pub const MIN_DEBT_USD: &str = "MIN_DEBT_USD";
/// Maximum health factor for a candidate.
pub const MAX_HEALTH_FACTOR: &str = "MAX_HEALTH_FACTOR";
/// Output CSV path.
pub const OUTPUT_CSV: &str = "OUTPUT_CSV";
/// Indexing API endpoint.
pub const SUBGRAPH_URL: &str = "SUBGRAPH_URL";
/// Portfolio API base URL.
pub const DEBANK_API_URL: &str = "DEBANK_API_URL";
/// Tracked protocol identifier in portfolio responses.
pub const PROTOCOL_ID: &str = "PROTOCOL_ID";
/// Maximum in-flight enrichment requests.
pub const ENRICH_CONCURRENCY: &str = "ENRICH_CONCURRENCY";
/// Portfolio API credential.
pub const DEBANK_API_KEY: &str = "DEBANK_API_KEY";

fn env_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").ok())
        .as_ref()
}

/// Expand ${VAR_NAME} patterns with environment variable values.
pub fn expand_env(s: &str) -> String {
    expand_with(s, |name| std::env::var(name).ok())
}

/// Expand ${VAR_NAME} patterns using `lookup`. Unknown variables are left as-is.
pub(crate) fn expand_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let Some(re) = env_pattern() else {
        return s.to_string();
    };

    let mut result = s.to_string();
    for cap in re.captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Some(value) = lookup(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    result
}

/// Whether a value still holds an unresolved `${VAR}` reference.
pub(crate) fn has_unresolved(s: &str) -> bool {
    env_pattern().is_some_and(|re| re.is_match(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env() {
        // Use unique var name to avoid conflicts with parallel tests
        std::env::set_var("EXPORT_ENV_TEST_VAR", "test_value");
        assert_eq!(expand_env("${EXPORT_ENV_TEST_VAR}"), "test_value");
        assert_eq!(
            expand_env("prefix_${EXPORT_ENV_TEST_VAR}_suffix"),
            "prefix_test_value_suffix"
        );
        assert_eq!(expand_env("no_vars"), "no_vars");
        std::env::remove_var("EXPORT_ENV_TEST_VAR");
    }

    #[test]
    fn test_unknown_var_left_in_place() {
        let expanded = expand_with("${MISSING}/path", |_| None);
        assert_eq!(expanded, "${MISSING}/path");
        assert!(has_unresolved(&expanded));
        assert!(!has_unresolved("https://openapi.debank.com"));
    }
}
