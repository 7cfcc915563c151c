//! Canonical URL construction

/// Join a base URL and a relative path with exactly one `/` between them.
///
/// An empty path returns the base unchanged.
pub fn combine_urls(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// `<base>/<resourceType>/<id>`
pub fn canonical_url(base: &str, resource_type: &str, id: &str) -> String {
    combine_urls(base, &format!("{}/{}", resource_type, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_slashes() {
        assert_eq!(combine_urls("http://example.com/", "/test"), "http://example.com/test");
    }

    #[test]
    fn test_join_missing_slash() {
        assert_eq!(combine_urls("http://example.com", "test"), "http://example.com/test");
    }

    #[test]
    fn test_join_with_slug() {
        assert_eq!(
            combine_urls("http://example.com/slug", "/test"),
            "http://example.com/slug/test"
        );
    }

    #[test]
    fn test_no_relative_path() {
        assert_eq!(combine_urls("http://example.com/slug", ""), "http://example.com/slug");
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(
            canonical_url("http://example.com//", "Library", "library-A"),
            "http://example.com/Library/library-A"
        );
    }
}
