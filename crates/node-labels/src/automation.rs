//! # Pull Request Labeling
//!
//! Resolve labels for a pull request and apply the ones that exist on the
//! repository. Labels the resolver suggests but the repository does not
//! define are reported, never created.

use serde::Serialize;
use tracing::{info, warn};

use crate::github::{GitHubError, LabelRepository};
use crate::resolver::LabelResolver;

/// Outcome of resolving labels for one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelPlan {
    /// Pull request number
    pub pr: u64,
    /// Branch the pull request targets
    pub base_branch: String,
    /// Number of changed files considered
    pub files: usize,
    /// Every label the resolver produced, in order
    pub resolved: Vec<String>,
    /// Resolved labels that exist on the repository
    pub applicable: Vec<String>,
    /// Resolved labels the repository does not define
    pub missing: Vec<String>,
    /// Whether `applicable` was sent to GitHub
    pub applied: bool,
}

/// Resolves and applies labels through a [`LabelRepository`].
pub struct LabelAutomation<R> {
    repository: R,
    resolver: LabelResolver,
}

impl<R: LabelRepository> LabelAutomation<R> {
    pub fn new(repository: R, resolver: LabelResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Work out which labels a pull request should get, without applying them.
    pub async fn plan(&self, owner: &str, repo: &str, pr: u64) -> Result<LabelPlan, GitHubError> {
        let files = self.repository.list_pull_request_files(owner, repo, pr).await?;
        let base_branch = self.repository.pull_request_base(owner, repo, pr).await?;
        let resolved = self.resolver.resolve(&files, Some(base_branch.as_str()));

        let (applicable, missing) = if resolved.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let existing = self.repository.fetch_existing_labels(owner, repo).await?;
            resolved
                .iter()
                .cloned()
                .partition(|label| existing.contains(label))
        };

        if !missing.is_empty() {
            warn!(pr, missing = ?missing, "Resolved labels not defined on repository");
        }

        Ok(LabelPlan {
            pr,
            base_branch,
            files: files.len(),
            resolved,
            applicable,
            missing,
            applied: false,
        })
    }

    /// Resolve labels and add the applicable ones to the pull request.
    pub async fn apply(
        &self,
        owner: &str,
        repo: &str,
        pr: u64,
        dry_run: bool,
    ) -> Result<LabelPlan, GitHubError> {
        let mut plan = self.plan(owner, repo, pr).await?;

        if dry_run || plan.applicable.is_empty() {
            info!(pr, dry_run, labels = ?plan.applicable, "Skipping label update");
            return Ok(plan);
        }

        self.repository
            .add_labels(owner, repo, pr, &plan.applicable)
            .await?;
        plan.applied = true;

        info!(pr, labels = ?plan.applicable, "Labels applied");
        Ok(plan)
    }
}
