//! Helpers for joining API base URLs with endpoint paths.

/// Strip trailing slashes so endpoints can be appended with a single `/`.
///
/// ```
/// use mycelial::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://openrouter.ai/api/v1/"), "https://openrouter.ai/api/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join `endpoint` onto `base_url` without doubled or missing slashes.
///
/// ```
/// use mycelial::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://openrouter.ai/api/v1/", "/chat/completions"),
///     "https://openrouter.ai/api/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

/// Normalized form of a user-supplied base URL, or `None` if it is not an
/// http(s) URL with a host.
pub fn validate_base_url(input: &str) -> Option<String> {
    let normalized = normalize_base_url(input);
    let rest = normalized
        .strip_prefix("https://")
        .or_else(|| normalized.strip_prefix("http://"))?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_every_trailing_slash() {
        assert_eq!(normalize_base_url("https://host/v1///"), "https://host/v1");
        assert_eq!(normalize_base_url("https://host"), "https://host");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn endpoints_join_with_one_slash() {
        for (base, endpoint) in [
            ("https://host/v1", "models"),
            ("https://host/v1/", "models"),
            ("https://host/v1", "/models"),
            ("https://host/v1//", "///models"),
        ] {
            assert_eq!(construct_api_url(base, endpoint), "https://host/v1/models");
        }
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert_eq!(
            validate_base_url(" https://openrouter.ai/api/v1/ ").as_deref(),
            Some("https://openrouter.ai/api/v1")
        );
        assert_eq!(
            validate_base_url("http://localhost:8080").as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn validate_rejects_other_schemes_and_missing_hosts() {
        assert_eq!(validate_base_url("ftp://host"), None);
        assert_eq!(validate_base_url("openrouter.ai"), None);
        assert_eq!(validate_base_url("https://"), None);
    }
}
