//! Canonical blocked domain set.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Deduplicated set of lowercase domain strings.
///
/// Every entry is trimmed, lowercased and non-empty. Iteration order is
/// unspecified. Serialized as a plain JSON list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct BlockedDomainSet {
    domains: AHashSet<String>,
}

impl BlockedDomainSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of domains in the set.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the set holds no domains.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Check whether a domain is present (case-insensitive).
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.trim().to_lowercase())
    }

    /// Insert a domain after normalizing it.
    ///
    /// Returns `true` if the domain was not already present. Blank input is
    /// ignored and returns `false`.
    pub fn insert(&mut self, domain: &str) -> bool {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return false;
        }
        self.domains.insert(domain)
    }

    /// Iterate over the domains in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// Collect the domains into a vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.domains.iter().cloned().collect()
    }

    /// Collect the domains into a sorted vector.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut domains = self.to_vec();
        domains.sort_unstable();
        domains
    }

    /// Union of this set and another.
    pub fn union(&self, other: &BlockedDomainSet) -> BlockedDomainSet {
        let mut merged = self.clone();
        merged.domains.extend(other.domains.iter().cloned());
        merged
    }
}

impl<S: AsRef<str>> FromIterator<S> for BlockedDomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = BlockedDomainSet::new();
        for domain in iter {
            set.insert(domain.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for BlockedDomainSet {
    fn from(domains: Vec<String>) -> Self {
        domains.into_iter().collect()
    }
}

impl From<BlockedDomainSet> for Vec<String> {
    fn from(set: BlockedDomainSet) -> Self {
        set.domains.into_iter().collect()
    }
}
