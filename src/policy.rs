//! Desired-state policy model
//!
//! This module defines the fixed repository settings applied to every
//! repository, the recognized CI workflow kinds, and the branch protection
//! policy derived from probe results — plus the wire encodings the GitHub
//! REST API expects.

use serde::{Deserialize, Serialize};

/// A repository as returned by the list endpoint.
///
/// A fresh snapshot is fetched every run and never mutated locally; all
/// changes go through the remote API.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,

    /// Archived repositories are read-only on GitHub and excluded from
    /// all mutation.
    #[serde(default)]
    pub archived: bool,
}

/// Desired repository settings, applied identically to every repository.
///
/// Field names match the GitHub update-repository payload, so this struct
/// serializes directly into the PATCH body. Booleans stay native in the
/// model; the wire format accepts JSON booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSettings {
    #[serde(default)]
    pub has_issues: bool,

    #[serde(default)]
    pub has_projects: bool,

    #[serde(default)]
    pub has_wiki: bool,

    #[serde(default = "default_true")]
    pub allow_squash_merge: bool,

    #[serde(default)]
    pub allow_merge_commit: bool,

    #[serde(default)]
    pub allow_rebase_merge: bool,

    #[serde(default)]
    pub allow_auto_merge: bool,

    #[serde(default = "default_true")]
    pub delete_branch_on_merge: bool,

    #[serde(default = "default_true")]
    pub allow_update_branch: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            has_issues: false,
            has_projects: false,
            has_wiki: false,
            allow_squash_merge: true,
            allow_merge_commit: false,
            allow_rebase_merge: false,
            allow_auto_merge: false,
            delete_branch_on_merge: true,
            allow_update_branch: true,
        }
    }
}

/// A CI workflow kind recognized by the protection policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowKind {
    /// Status-check context the workflow reports (e.g. "cicd")
    pub context: String,

    /// Workflow file whose run history is probed (e.g. "cicd.yml")
    pub file: String,
}

impl WorkflowKind {
    pub fn new(context: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            file: file.into(),
        }
    }
}

/// Declarative (repository, workflow-kind) probe override.
///
/// A listed pair short-circuits the prober to `present` without any API
/// call, so known-bad CI configurations are data rather than scattered
/// conditionals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOverride {
    pub repository: String,

    /// Context of the workflow kind the override applies to
    pub context: String,

    /// Forced probe result; omitted in YAML means "treat as absent"
    #[serde(default)]
    pub present: bool,
}

/// Outcome of probing one workflow kind in one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub context: String,
    pub present: bool,
}

/// Branch protection policy for a repository's protected branch.
///
/// The check set is derived per repository from probe results; the rest of
/// the policy is fixed: merges require up-to-date branches, zero approving
/// reviews, rules apply to admins, and pushes are open to anyone with
/// write access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionPolicy {
    pub strict: bool,
    pub checks: Vec<RequiredCheck>,
    pub required_approving_reviews: u32,
    pub enforce_admins: bool,
}

/// A named status-check context required before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredCheck {
    pub context: String,
}

impl ProtectionPolicy {
    /// Build the policy for one repository from its probe results.
    ///
    /// Includes one required check per workflow kind that probed present.
    /// Contexts are a set: a duplicate context keeps its first occurrence.
    /// An empty check set still enables protection.
    pub fn from_probes(probes: &[ProbeResult]) -> Self {
        let mut checks: Vec<RequiredCheck> = Vec::new();
        for probe in probes {
            if probe.present && !checks.iter().any(|c| c.context == probe.context) {
                checks.push(RequiredCheck {
                    context: probe.context.clone(),
                });
            }
        }

        Self {
            strict: true,
            checks,
            required_approving_reviews: 0,
            enforce_admins: true,
        }
    }

    /// Encode the policy as the full-replace protection request body.
    pub fn to_request(&self) -> ProtectionRequest {
        ProtectionRequest {
            required_status_checks: RequiredStatusChecks {
                strict: self.strict,
                checks: self.checks.clone(),
            },
            required_pull_request_reviews: ReviewRequirements {
                required_approving_review_count: self.required_approving_reviews,
            },
            enforce_admins: self.enforce_admins,
            restrictions: None,
        }
    }
}

/// Wire body for the update-branch-protection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionRequest {
    pub required_status_checks: RequiredStatusChecks,
    pub required_pull_request_reviews: ReviewRequirements,
    pub enforce_admins: bool,

    /// The endpoint requires an explicit `restrictions: null`
    pub restrictions: Option<PushRestrictions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequiredStatusChecks {
    pub strict: bool,
    pub checks: Vec<RequiredCheck>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequirements {
    pub required_approving_review_count: u32,
}

/// Push restriction lists; never populated by this policy.
#[derive(Debug, Clone, Serialize)]
pub struct PushRestrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}
