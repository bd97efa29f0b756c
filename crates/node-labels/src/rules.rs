//! # Path Rules
//!
//! A rule pairs a path [`Matcher`] with the [`Effect`]s it produces. Rules are
//! kept in an ordered [`RuleTable`] and the first matching rule decides the
//! labels for a path; later rules never see a path an earlier rule claimed.

use regex::{Captures, Regex};

use crate::subsystems::is_js_subsystem;

/// How a rule selects the paths it applies to.
#[derive(Debug)]
pub enum Matcher {
    /// The whole path must equal this string
    Exact(&'static str),
    /// The path must start with this string
    Prefix(&'static str),
    /// The path must match this regex (captures feed [`Effect::Capture`])
    Pattern(Regex),
}

/// A label-producing effect of a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Emit the label as written
    Label(&'static str),
    /// Emit the text of a capture group; empty or missing groups emit nothing
    Capture(usize),
    /// Emit the capture group only when it names a known JS subsystem
    Subsystem(usize),
}

/// An ordered path rule.
#[derive(Debug)]
pub struct Rule {
    matcher: Matcher,
    effects: Vec<Effect>,
}

impl Rule {
    /// Rule matching one exact path.
    #[must_use]
    pub fn exact(path: &'static str, effects: &[Effect]) -> Self {
        Self {
            matcher: Matcher::Exact(path),
            effects: effects.to_vec(),
        }
    }

    /// Rule matching every path below a prefix.
    #[must_use]
    pub fn prefix(prefix: &'static str, effects: &[Effect]) -> Self {
        Self {
            matcher: Matcher::Prefix(prefix),
            effects: effects.to_vec(),
        }
    }

    /// Rule matching a regex.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Tables are built from
    /// literals, so this only fires on a typo in the table itself.
    #[must_use]
    pub fn pattern(pattern: &str, effects: &[Effect]) -> Self {
        Self {
            matcher: Matcher::Pattern(
                Regex::new(pattern).unwrap_or_else(|e| panic!("invalid rule {pattern:?}: {e}")),
            ),
            effects: effects.to_vec(),
        }
    }

    /// Labels this rule yields for `path`, or `None` if it does not match.
    #[must_use]
    pub fn apply(&self, path: &str) -> Option<Vec<String>> {
        match &self.matcher {
            Matcher::Exact(exact) => (path == *exact).then(|| self.emit(None)),
            Matcher::Prefix(prefix) => path.starts_with(prefix).then(|| self.emit(None)),
            Matcher::Pattern(regex) => regex.captures(path).map(|caps| self.emit(Some(&caps))),
        }
    }

    fn emit(&self, caps: Option<&Captures<'_>>) -> Vec<String> {
        self.effects
            .iter()
            .filter_map(|effect| match *effect {
                Effect::Label(label) => Some(label.to_string()),
                Effect::Capture(group) => capture(caps, group).map(str::to_string),
                Effect::Subsystem(group) => capture(caps, group)
                    .filter(|name| is_js_subsystem(name))
                    .map(str::to_string),
            })
            .collect()
    }
}

fn capture<'h>(caps: Option<&Captures<'h>>, group: usize) -> Option<&'h str> {
    caps.and_then(|c| c.get(group))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

/// First-match-wins list of rules.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Labels for `path` from the first rule that matches it.
    ///
    /// `Some(vec![])` means a rule claimed the path but emits nothing
    /// (ignore-list entries), which still stops later rules from matching.
    #[must_use]
    pub fn labels_for(&self, path: &str) -> Option<Vec<String>> {
        self.rules.iter().find_map(|rule| rule.apply(path))
    }

    /// Whether any rule claims `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.labels_for(path).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
