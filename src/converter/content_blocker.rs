//! Projections of the canonical domain set into enforcement-ready shapes.
//!
//! Two shapes exist: a flat list of domains for enforcement that consumes
//! raw strings, and a capped list of URL-filter block rules in the
//! content-blocker JSON format. Both are pure functions of the set.

use serde::{Deserialize, Serialize};

use crate::domain_set::BlockedDomainSet;

/// Maximum number of rules a content blocker list may hold.
pub const MAX_CONTENT_BLOCKER_RULES: usize = 50_000;

/// A single `{trigger, action}` content-blocker rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlockerRule {
    pub trigger: Trigger,
    pub action: Action,
}

/// Rule trigger: a regular expression matched against request URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "url-filter")]
    pub url_filter: String,
}

/// Rule action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Block,
}

impl ContentBlockerRule {
    /// Build a block rule for one domain.
    pub fn block(domain: &str) -> Self {
        Self {
            trigger: Trigger {
                url_filter: url_filter_for(domain),
            },
            action: Action {
                action_type: ActionType::Block,
            },
        }
    }
}

/// Flat list of domains, as consumed by VPN/DNS style enforcement.
pub fn to_domain_list(domains: &BlockedDomainSet) -> Vec<String> {
    domains.to_vec()
}

/// Content-blocker rules for the set, capped at [`MAX_CONTENT_BLOCKER_RULES`].
///
/// Domains are emitted in sorted order so exports are stable. Anything past
/// the cap is dropped silently; callers can compare lengths to detect it.
pub fn to_content_blocker_rules(domains: &BlockedDomainSet) -> Vec<ContentBlockerRule> {
    to_content_blocker_rules_with_limit(domains, MAX_CONTENT_BLOCKER_RULES)
}

/// Content-blocker rules with an explicit cap.
pub(crate) fn to_content_blocker_rules_with_limit(
    domains: &BlockedDomainSet,
    limit: usize,
) -> Vec<ContentBlockerRule> {
    let sorted = domains.to_sorted_vec();
    if sorted.len() > limit {
        log::warn!(
            "Content blocker rule list truncated: {} domains, {} rules kept",
            sorted.len(),
            limit
        );
    }
    sorted
        .iter()
        .take(limit)
        .map(|domain| ContentBlockerRule::block(domain))
        .collect()
}

/// Turn a domain into a URL-filter regex.
///
/// Metacharacters are escaped, `*` becomes `.*`, and each end is padded with
/// `.*` unless it already carries a wildcard.
pub fn url_filter_for(domain: &str) -> String {
    let escaped = regex::escape(domain).replace(r"\*", ".*");

    let mut filter = String::with_capacity(escaped.len() + 4);
    if !escaped.starts_with(".*") {
        filter.push_str(".*");
    }
    filter.push_str(&escaped);
    if !escaped.ends_with(".*") {
        filter.push_str(".*");
    }
    filter
}
