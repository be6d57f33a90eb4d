//! Path relevance filtering for restricted installs.

/// Decide whether `path` falls under one of the configured root paths.
///
/// With no roots configured every path is relevant. Otherwise a path is
/// relevant iff it equals a root or descends from one; the prefix match
/// is segment-aware, so `/content/site1ButNotSameRoot` does not match
/// the root `/content/site1`.
#[must_use]
pub fn is_relevant_path(path: &str, restricted_roots: &[String]) -> bool {
    if restricted_roots.is_empty() {
        return true;
    }
    restricted_roots
        .iter()
        .any(|root| path == root || path.starts_with(&format!("{root}/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_roots_means_everything_relevant() {
        assert!(is_relevant_path("/content/anything", &[]));
        assert!(is_relevant_path("/", &[]));
    }

    #[test]
    fn test_exact_and_descendant_matches() {
        let r = roots(&["/content/site1", "/content/site3"]);

        assert!(is_relevant_path("/content/site1", &r));
        assert!(is_relevant_path("/content/site1/page", &r));
        assert!(is_relevant_path("/content/site3", &r));
        assert!(is_relevant_path("/content/site3/page", &r));
    }

    #[test]
    fn test_shared_prefix_without_separator_is_not_relevant() {
        let r = roots(&["/content/site1", "/content/site3"]);

        assert!(!is_relevant_path("/content/site1ButNotSameRoot", &r));
        assert!(!is_relevant_path("/content/site2", &r));
        assert!(!is_relevant_path("/content/site2/page", &r));
        assert!(!is_relevant_path("/etc/cloudservices", &r));
    }
}
