//! Event keys.
//!
//! Subscribers register against an [`EventKey`]: a literal name, a list of
//! segments joined by the dispatcher delimiter, or a regular expression.
//! Only literal names (after normalization) can be dispatched.

use regex::Regex;
use std::fmt;

use crate::error::SubscribeError;

/// Default segment separator for hierarchical event names.
pub const DEFAULT_DELIMITER: &str = ".";

/// Literal names reserved for internal lifecycle events.
pub const RESERVED_EVENTS: [&str; 3] = ["error", "subscribe", "unsubscribe"];

/// Returns `true` if `name` is reserved and cannot be subscribed to.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_EVENTS.contains(&name)
}

/// The key a subscriber is registered against.
#[derive(Clone, Debug)]
pub enum EventKey {
    /// A literal event name such as `"user.created"`.
    Name(String),
    /// A hierarchical name given as segments, joined with the delimiter.
    Segments(Vec<String>),
    /// A regular expression tested against dispatched names.
    ///
    /// Patterns are identified by their source text. Regexes sharing a
    /// source but built with different flags (for example through
    /// `RegexBuilder::case_insensitive`) address the same subscription
    /// entry, which keeps the flags of the first regex subscribed.
    Pattern(Regex),
}

impl EventKey {
    /// Compile a pattern key from a regular expression source.
    pub fn pattern(source: &str) -> Result<Self, SubscribeError> {
        Ok(EventKey::Pattern(Regex::new(source)?))
    }

    /// Join segment keys with `delimiter`; other keys are returned as-is.
    pub fn normalize(self, delimiter: &str) -> Self {
        match self {
            EventKey::Segments(segments) => EventKey::Name(segments.join(delimiter)),
            other => other,
        }
    }

    /// The literal name, if this key is a [`EventKey::Name`].
    pub fn as_name(&self) -> Option<&str> {
        match self {
            EventKey::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Returns `true` for pattern keys.
    pub fn is_pattern(&self) -> bool {
        matches!(self, EventKey::Pattern(_))
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Name(name) => f.write_str(name),
            EventKey::Segments(segments) => write!(f, "{}", segments.join(DEFAULT_DELIMITER)),
            EventKey::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for EventKey {
    fn from(name: &str) -> Self {
        EventKey::Name(name.to_owned())
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        EventKey::Name(name)
    }
}

impl From<&String> for EventKey {
    fn from(name: &String) -> Self {
        EventKey::Name(name.clone())
    }
}

impl From<Vec<String>> for EventKey {
    fn from(segments: Vec<String>) -> Self {
        EventKey::Segments(segments)
    }
}

impl From<&[&str]> for EventKey {
    fn from(segments: &[&str]) -> Self {
        EventKey::Segments(segments.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventKey {
    fn from(segments: [&str; N]) -> Self {
        EventKey::Segments(segments.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<Regex> for EventKey {
    fn from(regex: Regex) -> Self {
        EventKey::Pattern(regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_join_with_delimiter() {
        let key = EventKey::from(["users", "create"]).normalize("/");
        assert_eq!(key.as_name(), Some("users/create"));
    }

    #[test]
    fn patterns_survive_normalization() {
        let key = EventKey::pattern("^users\\.").unwrap().normalize(".");
        assert!(key.is_pattern());
        assert_eq!(key.to_string(), "/^users\\./");
    }

    #[test]
    fn bad_pattern_is_rejected() {
        assert!(matches!(
            EventKey::pattern("("),
            Err(SubscribeError::InvalidPattern(_))
        ));
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved("error"));
        assert!(is_reserved("unsubscribe"));
        assert!(!is_reserved("errors"));
    }
}
