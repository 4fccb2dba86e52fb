/// Normalizes a URL for visited-set keying
///
/// Normalization is deliberately weak: only trailing `/` characters are
/// trimmed, so `http://example.com/` and `http://example.com` share one
/// visited entry. Query strings, fragments, host case, and percent-encoding
/// are preserved as received.
///
/// # Examples
///
/// ```
/// use threat_crawler::url::normalize;
///
/// assert_eq!(normalize("http://example.com/"), "http://example.com");
/// assert_eq!(normalize("http://example.com/a?b=1"), "http://example.com/a?b=1");
/// ```
pub fn normalize(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(normalize("http://example.com/"), "http://example.com");
    }

    #[test]
    fn test_multiple_trailing_slashes_trimmed() {
        assert_eq!(normalize("http://example.com///"), "http://example.com");
    }

    #[test]
    fn test_no_trailing_slash_unchanged() {
        assert_eq!(normalize("http://example.com/page"), "http://example.com/page");
    }

    #[test]
    fn test_slash_variants_share_a_key() {
        assert_eq!(normalize("http://x/"), normalize("http://x"));
    }

    #[test]
    fn test_query_preserved() {
        assert_eq!(
            normalize("http://example.com/page?b=2&a=1"),
            "http://example.com/page?b=2&a=1"
        );
    }

    #[test]
    fn test_fragment_preserved() {
        assert_eq!(
            normalize("http://example.com/page#section"),
            "http://example.com/page#section"
        );
    }

    #[test]
    fn test_host_case_preserved() {
        assert_eq!(normalize("http://EXAMPLE.com/"), "http://EXAMPLE.com");
    }
}
