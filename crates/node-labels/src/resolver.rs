//! # Label Resolution
//!
//! Turns the list of files changed by a pull request into an ordered,
//! duplicate-free list of labels.
//!
//! ## Example
//!
//! ```
//! use node_labels::{LabelResolver, ResolverConfig};
//!
//! let resolver = LabelResolver::new(ResolverConfig::default());
//! let labels = resolver.resolve(&["src/node_buffer.cc"], None);
//! assert_eq!(labels, ["needs-ci", "c++", "buffer"]);
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::subsystems::{
    is_js_subsystem, EXCLUSIVE_RULES, LIB_SRC, NEEDS_CI, STICKY_LABELS, SUBSYSTEM_RULES,
};

/// Environment variable overriding the subsystem collapse threshold.
pub const ENV_MAX_LABELS_LIMIT: &str = "MAX_LABELS_LIMIT";

/// Default number of distinct subsystem labels kept before collapsing.
pub const DEFAULT_LABEL_LIMIT: usize = 4;

/// Release branches: `v20.x`, `v0.12`, optionally with `-staging`.
static RELEASE_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(v\d+\.(?:\d+|x))(?:-staging)?$").expect("valid regex"));

static DOC_API_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^doc/api/[^/]+\.md$").expect("valid regex"));

/// Prefixes whose changes always need a CI run.
const CI_PREFIXES: &[&str] = &[
    "lib/",
    "src/",
    "test/",
    "deps/",
    "benchmark/async-hooks/",
    "benchmark/async_hooks/",
];

/// Labels that make a release-branch label worthwhile.
const VERSIONED_LABELS: &[&str] = &["v8 engine", "build"];

/// Resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Distinct subsystem labels kept before they collapse into `lib / src`
    pub label_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            label_limit: DEFAULT_LABEL_LIMIT,
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub const fn with_label_limit(label_limit: usize) -> Self {
        Self { label_limit }
    }

    /// Read `MAX_LABELS_LIMIT`, falling back to the default when unset or invalid.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            label_limit: std::env::var(ENV_MAX_LABELS_LIMIT)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_LABEL_LIMIT),
        }
    }
}

/// Insertion-ordered set of labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label` unless already present. Returns whether it was added.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    /// Put `label` in front unless already present anywhere.
    pub fn prepend(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.contains(&label) {
            self.labels.insert(0, label);
        }
    }

    pub fn remove(&mut self, label: &str) {
        self.labels.retain(|l| l != label);
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.labels
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Tracks distinct subsystem labels for the `lib / src` collapse.
///
/// Pinned labels come from bundled dependencies: they are never counted and
/// survive a collapse.
#[derive(Debug)]
struct CollapseCounter {
    limit: usize,
    seen: Vec<String>,
    pinned: Vec<String>,
    collapsed: bool,
}

impl CollapseCounter {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: Vec::new(),
            pinned: Vec::new(),
            collapsed: false,
        }
    }

    /// Add `label` to `labels` outside the count.
    fn pin(&mut self, labels: &mut LabelSet, label: String) {
        if !self.pinned.contains(&label) {
            self.pinned.push(label.clone());
        }
        labels.insert(label);
    }

    /// Add `label` to `labels`, collapsing counted subsystems once a new one
    /// arrives past the limit.
    fn admit(&mut self, labels: &mut LabelSet, label: String) {
        if STICKY_LABELS.contains(&label.as_str())
            || self.pinned.contains(&label)
            || self.seen.contains(&label)
        {
            labels.insert(label);
            return;
        }

        if self.seen.len() >= self.limit {
            for counted in &self.seen {
                if !self.pinned.contains(counted) {
                    labels.remove(counted);
                }
            }
            labels.insert(LIB_SRC);
            if !self.collapsed {
                debug!(limit = self.limit, dropped = ?self.seen, "Collapsing subsystem labels");
                self.collapsed = true;
            }
            return;
        }

        self.seen.push(label.clone());
        labels.insert(label);
    }
}

/// Resolves labels for a set of changed paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelResolver {
    config: ResolverConfig,
}

impl LabelResolver {
    #[must_use]
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Resolve the labels for `paths`, optionally targeting `branch`.
    ///
    /// Unrecognized paths contribute nothing; an empty input yields no labels.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, paths: &[S], branch: Option<&str>) -> Vec<String> {
        let paths: Vec<&str> = paths.iter().map(AsRef::as_ref).collect();

        let (mut labels, versioned) = match exclusive_labels(&paths) {
            Some(labels) => {
                let versioned = VERSIONED_LABELS.iter().any(|l| labels.contains(l));
                (labels, versioned)
            }
            None => self.subsystem_labels(&paths),
        };

        if paths
            .iter()
            .any(|path| CI_PREFIXES.iter().any(|prefix| path.starts_with(prefix)))
        {
            labels.prepend(NEEDS_CI);
        }

        if versioned {
            if let Some(version) = branch.and_then(release_line) {
                labels.insert(version);
            }
        }

        debug!(files = paths.len(), labels = ?labels, "Resolved labels");
        labels.into_vec()
    }

    /// Labels from the general table, plus whether any path emitted a label
    /// that makes a release-line label worthwhile. That is decided before
    /// the collapse can drop `build` or `v8 engine`.
    fn subsystem_labels(&self, paths: &[&str]) -> (LabelSet, bool) {
        let limit_applies = paths
            .iter()
            .any(|path| path.starts_with("lib/") || path.starts_with("src/"));
        let mut counter = CollapseCounter::new(self.config.label_limit);
        let mut labels = LabelSet::new();
        let mut versioned = false;

        for path in paths {
            let Some(mapped) = SUBSYSTEM_RULES.labels_for(path) else {
                continue;
            };
            let bundled = path.starts_with("deps/");
            for label in mapped {
                versioned |= VERSIONED_LABELS.contains(&label.as_str());
                if !limit_applies {
                    labels.insert(label);
                } else if bundled {
                    counter.pin(&mut labels, label);
                } else {
                    counter.admit(&mut labels, label);
                }
            }
        }

        (labels, versioned)
    }
}

/// Labels for a change made only of tests, docs and benchmarks.
///
/// `None` when some path falls outside those areas, or when a mixed
/// doc change leaves nothing meaningful to say.
fn exclusive_labels(paths: &[&str]) -> Option<LabelSet> {
    let mut labels = LabelSet::new();
    for path in paths {
        labels.extend(EXCLUSIVE_RULES.labels_for(path)?);
    }

    let api_docs: HashSet<&str> = paths
        .iter()
        .copied()
        .filter(|path| DOC_API_FILE.is_match(path))
        .collect();

    if labels.contains("doc") && (labels.len() > 2 || api_docs.len() > 1) {
        let only_subsystems = labels
            .iter()
            .filter(|l| *l != "doc")
            .all(is_js_subsystem);
        let only_docs = paths.iter().all(|path| path.starts_with("doc/"));

        if only_subsystems || only_docs {
            return Some(std::iter::once("doc").collect());
        }
        return None;
    }

    (!labels.is_empty()).then_some(labels)
}

impl Extend<String> for LabelSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for label in iter {
            self.insert(label);
        }
    }
}

/// The release line a branch targets, e.g. `v20.x-staging` -> `v20.x`.
#[must_use]
pub fn release_line(branch: &str) -> Option<String> {
    RELEASE_BRANCH
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolve labels with the default configuration.
#[must_use]
pub fn resolve_labels<S: AsRef<str>>(paths: &[S], branch: Option<&str>) -> Vec<String> {
    LabelResolver::default().resolve(paths, branch)
}
