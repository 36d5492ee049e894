use crate::{
    DEFAULT_NAMESPACE, TEST_APP_HTTP_REQUESTS_TOTAL, TEST_APP_HTTP_RESPONSE_TIME_SECONDS,
    TEST_APP_RESPONSE_STATUS,
};

/// Standard HTTP request duration buckets measured in seconds. The default buckets are tailored to broadly
/// measure the response time of a network service. Most likely, however, you will be required to define
/// buckets customized to your use case.
pub const SECONDS_DURATION_BUCKETS: &[f64; 11] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Swaps the default namespace of a metric name for `prefix`.
pub(crate) fn with_prefix(prefix: &str, default_name: &str) -> String {
    let suffix = default_name
        .strip_prefix(DEFAULT_NAMESPACE)
        .unwrap_or(default_name);
    if prefix.is_empty() {
        suffix.trim_start_matches('_').to_owned()
    } else {
        format!("{prefix}{suffix}")
    }
}

/// Default names for the three instruments, in registration order.
pub(crate) fn default_names() -> [&'static str; 3] {
    [
        TEST_APP_HTTP_REQUESTS_TOTAL,
        TEST_APP_RESPONSE_STATUS,
        TEST_APP_HTTP_RESPONSE_TIME_SECONDS,
    ]
}

/// Checks a name against the Prometheus metric name charset `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub(crate) fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_replaces_namespace() {
        assert_eq!(
            with_prefix("pref", TEST_APP_HTTP_REQUESTS_TOTAL),
            "pref_http_requests_total"
        );
        assert_eq!(
            with_prefix("", TEST_APP_RESPONSE_STATUS),
            "response_status"
        );
    }

    #[test]
    fn metric_name_charset() {
        assert!(is_valid_metric_name("test_app_http_requests_total"));
        assert!(is_valid_metric_name("ns:sub_total"));
        assert!(!is_valid_metric_name(""));
        assert!(!is_valid_metric_name("9lives"));
        assert!(!is_valid_metric_name("with-dash"));
    }
}
