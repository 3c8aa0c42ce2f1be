//! Fixed-prefix SysEx template matching
//!
//! A template is a complete SysEx message (`F0 ... F7`). An inbound message
//! matches when it is identical to the template, or when it starts with the
//! template minus its terminator. In the second case every byte after the
//! prefix, except the message's own trailing `F7`, is returned as payload.
//!
//! Template authors must not place `F7` anywhere but the final position:
//! only the first occurrence is stripped before prefix comparison.

use crate::midi::SYSEX_END;

/// Outcome of matching a message against a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The message is not an instance of the template
    NoMatch,
    /// The message matched; payload is empty for an exact match
    Matched(Vec<u8>),
}

/// Match `message` against `template`
pub fn match_template(template: &[u8], message: &[u8]) -> MatchResult {
    if template.len() > message.len() {
        return MatchResult::NoMatch;
    }

    if template == message {
        return MatchResult::Matched(Vec::new());
    }

    let mut prefix = template.to_vec();
    if let Some(pos) = prefix.iter().position(|&b| b == SYSEX_END) {
        prefix.remove(pos);
    }

    if !message.starts_with(&prefix) {
        return MatchResult::NoMatch;
    }

    let mut rest = &message[prefix.len()..];
    if let Some((&SYSEX_END, interior)) = rest.split_last() {
        rest = interior;
    }

    MatchResult::Matched(rest.to_vec())
}
