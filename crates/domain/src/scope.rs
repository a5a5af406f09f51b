use crate::candidate::normalize_name;
use std::collections::HashSet;
use std::sync::Arc;

/// Returns true when `name` equals `suffix` or is a subdomain of it.
///
/// Both sides must already be normalized.
fn is_same_or_subdomain(name: &str, suffix: &str) -> bool {
    if name == suffix {
        return true;
    }
    name.len() > suffix.len()
        && name.ends_with(suffix)
        && name.as_bytes()[name.len() - suffix.len() - 1] == b'.'
}

/// Root domains under study.
#[derive(Debug, Clone, Default)]
pub struct ScopeSet {
    domains: Vec<Arc<str>>,
}

impl ScopeSet {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for d in domains {
            set.insert(d.as_ref());
        }
        set
    }

    pub fn insert(&mut self, domain: &str) -> bool {
        let Some(domain) = normalize_name(domain) else {
            return false;
        };
        if self.domains.iter().any(|d| d.as_ref() == domain) {
            return false;
        }
        self.domains.push(Arc::from(domain));
        // Longest suffix first so nested roots (a.example.com vs example.com) pick the deeper one.
        self.domains.sort_by(|a, b| b.len().cmp(&a.len()));
        true
    }

    /// Suffix-based derivation of the root domain for `name`.
    ///
    /// Returns `None` when the name falls outside every configured domain.
    pub fn subdomain_to_domain(&self, name: &str) -> Option<Arc<str>> {
        let name = normalize_name(name)?;
        self.domains
            .iter()
            .find(|d| is_same_or_subdomain(&name, d))
            .map(Arc::clone)
    }

    pub fn domains(&self) -> &[Arc<str>] {
        &self.domains
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }
}

/// Names excluded from investigation, together with everything below them.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: HashSet<Arc<str>>,
}

impl Blacklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|e| normalize_name(e.as_ref()))
            .map(Arc::from)
            .collect();
        Self { entries }
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let Some(name) = normalize_name(name) else {
            return false;
        };
        self.entries.iter().any(|e| is_same_or_subdomain(&name, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
