use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unique data-request URLs observed for one site, in first-seen order.
///
/// Uniqueness is by exact URL string, query included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CapturedSet {
    urls: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl CapturedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the URL was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }
}

impl From<Vec<String>> for CapturedSet {
    fn from(urls: Vec<String>) -> Self {
        urls.into_iter().collect()
    }
}

impl From<CapturedSet> for Vec<String> {
    fn from(set: CapturedSet) -> Self {
        set.urls
    }
}

impl<S: Into<String>> FromIterator<S> for CapturedSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = CapturedSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl<'a> IntoIterator for &'a CapturedSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

/// Outcome of one successful session: the site URL and what it fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCapture {
    pub url: String,
    pub captured: CapturedSet,
}

impl SiteCapture {
    pub fn new(url: String, captured: CapturedSet) -> Self {
        Self { url, captured }
    }
}
