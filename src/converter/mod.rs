//! Format converters for blocklists.

mod content_blocker;
mod text;

pub use content_blocker::{
    to_content_blocker_rules, to_domain_list, url_filter_for, Action, ActionType,
    ContentBlockerRule, Trigger, MAX_CONTENT_BLOCKER_RULES,
};
pub use text::parse_domain_list;
