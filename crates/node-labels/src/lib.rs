//! Pull request labeling for the Node.js repository.
//!
//! Maps the files a pull request changes to the labels it should carry:
//! subsystem names (`fs`, `http2`, `crypto`), areas (`doc`, `build`, `c++`,
//! `tools`), CI requirements (`needs-ci`) and release lines (`v20.x`).
//!
//! # Usage
//!
//! ```
//! use node_labels::resolve_labels;
//!
//! let labels = resolve_labels(&["lib/assert.js", "lib/dns.js"], None);
//! assert_eq!(labels, ["needs-ci", "assert", "dns"]);
//!
//! let labels = resolve_labels(&["doc/api/modules.md"], None);
//! assert_eq!(labels, ["doc", "module"]);
//! ```
//!
//! # Configuration
//!
//! - `MAX_LABELS_LIMIT`: distinct subsystem labels kept before they collapse
//!   into `lib / src` (default 4)
//! - `GITHUB_TOKEN`: token for the GitHub API
//! - `GITHUB_API_URL`: API endpoint (default `https://api.github.com`)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod automation;
pub mod config;
pub mod github;
pub mod resolver;
pub mod rules;
pub mod subsystems;

pub use automation::{LabelAutomation, LabelPlan};
pub use config::Config;
pub use github::{parse_next_link, parse_repo, GitHubClient, GitHubError, LabelRepository};
pub use resolver::{release_line, resolve_labels, LabelResolver, LabelSet, ResolverConfig};
pub use rules::{Effect, Matcher, Rule, RuleTable};
