//! repoconform - Consistent GitHub Repository Configuration
//!
//! repoconform reconciles every repository owned by one GitHub account
//! against a single desired-state policy: fixed repository settings plus
//! branch protection derived from which CI workflows have actually run.
//!
//! ## Core Features
//!
//! - **Repository Enumeration**: Lists the account's repositories and skips
//!   archived (read-only) ones
//! - **Capability Probing**: Detects workflow run history per repository,
//!   with a declarative override table for known-bad CI setups
//! - **Settings Reconciliation**: Applies one fixed settings policy to
//!   every repository, idempotently
//! - **Branch Protection**: Requires exactly the status checks a repository
//!   can actually produce
//! - **Fail-Fast Runs**: Any API failure aborts the whole run with the
//!   offending status and response body
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`github`]: GitHub REST API client and authentication
//! - [`policy`]: Desired-state model and wire encodings
//! - [`probe`]: Workflow run-history probing
//! - [`reconcile`]: Run orchestration and reporting

pub mod config;
pub mod github;
pub mod policy;
pub mod probe;
pub mod reconcile;

pub use config::Config;
pub use github::GitHubClient;
pub use policy::{ProtectionPolicy, RepoSettings, WorkflowKind};
pub use probe::WorkflowProber;
pub use reconcile::{ReconcileEngine, ReconcileSummary};
