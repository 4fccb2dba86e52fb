use url::Url;

/// Extracts the comparable site host from a URL
///
/// The host is the parsed hostname with a single leading `www.` prefix
/// stripped, so `www.example.com` and `example.com` compare equal. A URL
/// that cannot be parsed is represented by its raw string, which classifies
/// it as external against any parsed base.
///
/// # Examples
///
/// ```
/// use threat_crawler::url::site_host;
///
/// assert_eq!(site_host("https://www.example.com/page"), "example.com");
/// assert_eq!(site_host("https://example.com:8080/"), "example.com");
/// ```
pub fn site_host(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            host.strip_prefix("www.").unwrap_or(host).to_string()
        }
        Err(_) => raw.to_string(),
    }
}

/// Returns true when both URLs resolve to the same site host
pub fn is_same_site(base: &str, candidate: &str) -> bool {
    site_host(base) == site_host(candidate)
}

/// Splits links into same-site and cross-site lists, preserving order
///
/// # Arguments
///
/// * `links` - The discovered links to classify
/// * `base` - The URL of the page the links were found on
pub fn partition_links(links: &[String], base: &str) -> (Vec<String>, Vec<String>) {
    let base_host = site_host(base);
    let mut internal = Vec::new();
    let mut external = Vec::new();

    for link in links {
        if site_host(link) == base_host {
            internal.push(link.clone());
        } else {
            external.push(link.clone());
        }
    }

    (internal, external)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_host_strips_www() {
        assert_eq!(site_host("https://www.example.com/"), "example.com");
    }

    #[test]
    fn test_site_host_without_www() {
        assert_eq!(site_host("https://example.com/page"), "example.com");
    }

    #[test]
    fn test_site_host_strips_only_one_www() {
        assert_eq!(site_host("https://www.www.example.com/"), "www.example.com");
    }

    #[test]
    fn test_site_host_excludes_port() {
        assert_eq!(site_host("http://example.com:8080/"), "example.com");
    }

    #[test]
    fn test_site_host_unparsable_is_raw() {
        assert_eq!(site_host("not a url"), "not a url");
    }

    #[test]
    fn test_www_symmetry() {
        assert!(is_same_site("https://a.com/", "https://www.a.com/x"));
        assert!(is_same_site("https://www.a.com/", "https://a.com/x"));
    }

    #[test]
    fn test_subdomain_is_external() {
        assert!(!is_same_site("https://a.com/", "https://blog.a.com/"));
    }

    #[test]
    fn test_different_hosts_are_external() {
        assert!(!is_same_site("https://a.com/", "https://b.com/"));
    }

    #[test]
    fn test_unparsable_candidate_is_external() {
        assert!(!is_same_site("https://a.com/", "nonsense"));
    }

    #[test]
    fn test_partition_preserves_order() {
        let links = vec![
            "https://a.com/1".to_string(),
            "https://b.com/x".to_string(),
            "https://www.a.com/2".to_string(),
            "https://c.com/y".to_string(),
        ];

        let (internal, external) = partition_links(&links, "https://a.com/");

        assert_eq!(internal, vec!["https://a.com/1", "https://www.a.com/2"]);
        assert_eq!(external, vec!["https://b.com/x", "https://c.com/y"]);
    }

    #[test]
    fn test_partition_empty_input() {
        let (internal, external) = partition_links(&[], "https://a.com/");
        assert!(internal.is_empty());
        assert!(external.is_empty());
    }
}
