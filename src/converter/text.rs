//! Plain-text blocklist parser.
//!
//! The feed format is one domain per line. Lines starting with `#` are
//! comments and blank lines are ignored. Both LF and CRLF endings work.

use crate::domain_set::BlockedDomainSet;

/// Parse raw feed text into the canonical domain set.
///
/// No domain syntax validation is done: anything that is not blank and not a
/// comment is kept, lowercased.
pub fn parse_domain_list(text: &str) -> BlockedDomainSet {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line)
}
