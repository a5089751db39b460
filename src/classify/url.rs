// src/classify/url.rs
//! URL path filtering (press releases, ads, jobs, obituaries, score tables, ...).

use super::PatternSet;

#[derive(Debug, Clone)]
pub struct UrlClassifier {
    patterns: PatternSet,
}

impl UrlClassifier {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// True if the URL's path hits any configured low-value segment.
    pub fn classify(&self, url: &str) -> bool {
        self.patterns.first_match(url_path(url)).is_some()
    }
}

/// Path part of `url`: after scheme and authority, before `?` or `#`.
/// Strings without a scheme are treated as a bare path.
pub fn url_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(i) => {
            let after = &url[i + 3..];
            match after.find(['/', '?', '#']) {
                Some(j) => &after[j..],
                None => "",
            }
        }
        None => url,
    };
    match rest.find(['?', '#']) {
        Some(k) => &rest[..k],
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifiers;
    use crate::config::FilterConfig;

    fn uc() -> UrlClassifier {
        Classifiers::compile(&FilterConfig::default()).unwrap().url
    }

    #[test]
    fn path_extraction() {
        assert_eq!(url_path("https://example.com/press-release/123"), "/press-release/123");
        assert_eq!(url_path("https://example.com"), "");
        assert_eq!(url_path("https://example.com?x=/jobs/"), "");
        assert_eq!(url_path("http://a.b/news/x?utm=1#top"), "/news/x");
        assert_eq!(url_path("/weather/today"), "/weather/today");
    }

    #[test]
    fn filtered_segments() {
        let u = uc();
        assert!(u.classify("https://example.com/press-release/123"));
        assert!(u.classify("https://example.com/Sponsored/deal"));
        assert!(u.classify("https://example.com/local/obituary/jane-doe"));
        assert!(u.classify("https://news.example/pr/acme-launch"));
    }

    #[test]
    fn query_strings_and_near_misses_pass() {
        let u = uc();
        assert!(!u.classify("https://example.com/news/markets-rally"));
        assert!(!u.classify("https://example.com/news/x?next=/jobs/"));
        assert!(!u.classify("https://example.com/press-releases-roundup"));
        assert!(!u.classify(""));
    }
}
