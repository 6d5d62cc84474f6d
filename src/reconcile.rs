//! Reconciliation engine
//!
//! Drives the full run: enumerate the account's repositories, skip the
//! archived ones, and for each remaining repository apply the desired
//! settings, probe workflow run history, and replace branch protection.
//! Any failure aborts the run immediately; rerunning the program is the
//! retry mechanism.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::github::GitHubClient;
use crate::policy::{ProbeResult, ProtectionPolicy};
use crate::probe::WorkflowProber;

/// Per-repository outcome of a successful reconciliation.
#[derive(Debug, Clone)]
pub struct RepoReport {
    pub name: String,
    pub probes: Vec<ProbeResult>,
}

/// Results from a complete reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub total_repositories: usize,
    pub reconciled: usize,
    pub archived_skipped: usize,
    pub duration: Duration,

    /// Probe columns, one per configured workflow kind
    pub columns: Vec<String>,
    pub reports: Vec<RepoReport>,
}

impl ReconcileSummary {
    /// Render the header line plus one column-aligned row per repository.
    pub fn table(&self) -> String {
        let mut out = String::new();

        let _ = write!(out, "{:<50}", "Repository");
        for column in &self.columns {
            let _ = write!(out, " {:<12}", format!("{column} job?"));
        }
        out.push('\n');

        for report in &self.reports {
            let _ = write!(out, "{:<50}", report.name);
            for probe in &report.probes {
                let _ = write!(out, " {:<12}", probe.present);
            }
            out.push('\n');
        }

        out
    }
}

/// The engine that reconciles every repository against the fixed policy.
///
/// Owns the single API client for the run; processing is strictly
/// sequential and each repository is independent of the others.
pub struct ReconcileEngine {
    config: Config,
    client: GitHubClient,
}

impl ReconcileEngine {
    pub fn new(config: Config, client: GitHubClient) -> Self {
        Self { config, client }
    }

    /// Run a complete reconciliation pass over the account.
    ///
    /// With `dry_run` set, repositories are enumerated and probed but no
    /// mutating call is issued.
    pub async fn run(&self, dry_run: bool) -> Result<ReconcileSummary> {
        let start_time = Instant::now();

        info!(
            "Starting reconciliation for account: {}",
            self.client.account()
        );
        if dry_run {
            info!("Dry run: settings and protections will not be written");
        }

        let repositories = self
            .client
            .list_repositories()
            .await
            .context("Failed to list repositories")?;

        let total_repositories = repositories.len();
        let prober = WorkflowProber::new(&self.client, &self.config.overrides);

        let mut reports = Vec::new();
        let mut archived_skipped = 0;

        for repo in &repositories {
            if repo.archived {
                // Mutations on archived repositories are rejected upstream
                debug!("Skipping archived repository: {}", repo.name);
                archived_skipped += 1;
                continue;
            }

            if !dry_run {
                self.client
                    .update_repository_settings(&repo.name, &self.config.settings)
                    .await?;
            }

            let mut probes = Vec::new();
            for workflow in &self.config.workflows {
                probes.push(prober.probe(&repo.name, workflow).await?);
            }

            if !dry_run {
                let policy = ProtectionPolicy::from_probes(&probes);
                self.client
                    .update_branch_protection(
                        &repo.name,
                        &self.config.github.protected_branch,
                        &policy.to_request(),
                    )
                    .await?;
            }

            info!("Reconciled repository: {}", repo.name);
            reports.push(RepoReport {
                name: repo.name.clone(),
                probes,
            });
        }

        let duration = start_time.elapsed();
        let reconciled = reports.len();

        info!(
            "Reconciliation completed in {:.2}s: {} reconciled, {} archived skipped",
            duration.as_secs_f64(),
            reconciled,
            archived_skipped
        );

        Ok(ReconcileSummary {
            total_repositories,
            reconciled,
            archived_skipped,
            duration,
            columns: self
                .config
                .workflows
                .iter()
                .map(|w| w.context.clone())
                .collect(),
            reports,
        })
    }
}
