//! Pre-cache manifest: the fixed asset list plus the injected data path, and
//! the version-qualified cache name derived from the build-time title.

use url::{Position, Url};

/// Assets every deployment ships.
const FIXED_ENTRIES: [&str; 4] = ["/", "/index.html", "/bundle.css", "/bundle.js"];

#[derive(Debug, Clone)]
pub struct CacheManifest {
    title: String,
    version: u32,
    scope: Url,
    entries: Vec<String>,
}

impl CacheManifest {
    pub fn new(title: impl Into<String>, version: u32, scope: Url) -> Self {
        Self {
            title: title.into(),
            version,
            scope,
            entries: FIXED_ENTRIES.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Append the externally injected data asset.
    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.entries.push(path.into());
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Suffix match against the request URL, ignoring query and fragment.
    ///
    /// Any URL whose path happens to end with an entry counts as a manifest
    /// asset; the broad match is deliberate, false positives accepted.
    pub fn matches(&self, url: &Url) -> bool {
        let base = &url[..Position::AfterPath];
        self.entries.iter().any(|entry| base.ends_with(entry))
    }

    /// Version-qualified cache name.
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.title, self.version)
    }

    /// Whether `name` belongs to an earlier (or later) version of this
    /// manifest's cache. Unrelated cache names are never stale.
    pub fn is_stale_cache(&self, name: &str) -> bool {
        name != self.cache_name() && name.starts_with(&format!("{}-v", self.title))
    }

    /// Entries resolved against the worker scope, ready to pre-fetch.
    pub fn precache_urls(&self) -> Result<Vec<Url>, url::ParseError> {
        self.entries
            .iter()
            .map(|entry| self.scope.join(entry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> CacheManifest {
        let scope = Url::parse("https://host/").unwrap();
        CacheManifest::new("reader", 2, scope).with_data_path("/data/book.json")
    }

    #[test]
    fn suffix_match_ignores_query_string() {
        let m = manifest();
        let url = Url::parse("https://host/app/bundle.js?v=2").unwrap();
        assert!(m.matches(&url));
    }

    #[test]
    fn suffix_match_accepts_any_prefix() {
        let m = manifest();
        assert!(m.matches(&Url::parse("https://cdn.other/deep/bundle.css").unwrap()));
        assert!(m.matches(&Url::parse("https://host/data/book.json").unwrap()));
    }

    #[test]
    fn unlisted_urls_do_not_match() {
        let m = manifest();
        assert!(!m.matches(&Url::parse("https://host/api/chapters").unwrap()));
        assert!(!m.matches(&Url::parse("https://host/app.js").unwrap()));
    }

    #[test]
    fn root_entry_matches_the_origin() {
        let m = manifest();
        assert!(m.matches(&Url::parse("https://host/").unwrap()));
    }

    #[test]
    fn cache_name_is_version_qualified() {
        assert_eq!(manifest().cache_name(), "reader-v2");
    }

    #[test]
    fn stale_detection_spares_unrelated_caches() {
        let m = manifest();
        assert!(m.is_stale_cache("reader-v1"));
        assert!(!m.is_stale_cache("reader-v2"));
        assert!(!m.is_stale_cache("other-app-v1"));
    }

    #[test]
    fn precache_urls_resolve_against_scope() {
        let urls = manifest().precache_urls().unwrap();
        assert_eq!(urls.len(), 5);
        assert!(urls.contains(&Url::parse("https://host/index.html").unwrap()));
        assert!(urls.contains(&Url::parse("https://host/data/book.json").unwrap()));
    }
}
