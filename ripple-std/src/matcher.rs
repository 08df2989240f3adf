//! Event matcher.
//!
//! Associates event names and patterns with subscriber ids and resolves the
//! ids to run for a dispatched name.
//!
//! Ordering rules:
//!
//! - within one name or pattern, the most recently subscribed id comes first;
//! - patterns are kept most recently subscribed first;
//! - every matching pattern's ids come before the exact ids.

use crate::registry::SubscriberId;
use regex::Regex;
use std::collections::{HashMap, VecDeque};

struct PatternEntry {
    regex: Regex,
    ids: VecDeque<SubscriberId>,
}

/// Exact-match and pattern tables.
#[derive(Default)]
pub struct EventIndex {
    exact: HashMap<String, VecDeque<SubscriberId>>,
    patterns: Vec<PatternEntry>,
}

impl EventIndex {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `id` at the front of `name`'s sequence.
    ///
    /// Returns `false` if `id` was already subscribed to `name`.
    pub fn insert_exact(&mut self, name: &str, id: SubscriberId) -> bool {
        let ids = self.exact.entry(name.to_owned()).or_default();
        if ids.contains(&id) {
            return false;
        }
        ids.push_front(id);
        true
    }

    /// Put `id` at the front of the pattern's sequence and move the pattern
    /// to the front of the pattern table.
    ///
    /// Patterns are identified by their source; an existing entry keeps the
    /// regex it was created with. Returns `false`, leaving both tables
    /// untouched, if `id` was already subscribed to the pattern.
    pub fn insert_pattern(&mut self, regex: &Regex, id: SubscriberId) -> bool {
        let mut entry = match self.pattern_position(regex.as_str()) {
            Some(position) if self.patterns[position].ids.contains(&id) => return false,
            Some(position) => self.patterns.remove(position),
            None => PatternEntry {
                regex: regex.clone(),
                ids: VecDeque::new(),
            },
        };

        entry.ids.push_front(id);
        self.patterns.insert(0, entry);
        true
    }

    /// Remove the ids of `name` rejected by `keep`; drops the entry when it
    /// becomes empty.
    pub fn remove_exact(
        &mut self,
        name: &str,
        mut keep: impl FnMut(SubscriberId) -> bool,
    ) -> Vec<SubscriberId> {
        let Some(ids) = self.exact.get_mut(name) else {
            return Vec::new();
        };
        let removed = drain_rejected(ids, &mut keep);
        if ids.is_empty() {
            self.exact.remove(name);
        }
        removed
    }

    /// Remove the ids of the pattern with `source` rejected by `keep`; drops
    /// the pattern when it becomes empty.
    pub fn remove_pattern(
        &mut self,
        source: &str,
        mut keep: impl FnMut(SubscriberId) -> bool,
    ) -> Vec<SubscriberId> {
        let Some(position) = self.pattern_position(source) else {
            return Vec::new();
        };
        let ids = &mut self.patterns[position].ids;
        let removed = drain_rejected(ids, &mut keep);
        if ids.is_empty() {
            self.patterns.remove(position);
        }
        removed
    }

    /// Returns `true` if `name` has exact subscribers.
    pub fn contains_exact(&self, name: &str) -> bool {
        self.exact.contains_key(name)
    }

    /// Ids to run for `name`, in dispatch order.
    pub fn resolve(&self, name: &str) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = self
            .patterns
            .iter()
            .filter(|entry| entry.regex.is_match(name))
            .flat_map(|entry| entry.ids.iter().copied())
            .collect();

        if let Some(exact) = self.exact.get(name) {
            ids.extend(exact.iter().copied());
        }
        ids
    }

    fn pattern_position(&self, source: &str) -> Option<usize> {
        self.patterns
            .iter()
            .position(|entry| entry.regex.as_str() == source)
    }
}

fn drain_rejected(
    ids: &mut VecDeque<SubscriberId>,
    keep: &mut impl FnMut(SubscriberId) -> bool,
) -> Vec<SubscriberId> {
    let mut removed = Vec::new();
    ids.retain(|&id| {
        if keep(id) {
            true
        } else {
            removed.push(id);
            false
        }
    });
    removed
}
