//! Capability probing
//!
//! Decides whether a CI workflow has run history in a repository. The
//! override table is consulted before the network, so repositories with
//! known-bad CI configurations are handled as data instead of inline
//! special cases.

use anyhow::Result;
use tracing::debug;

use crate::github::GitHubClient;
use crate::policy::{ProbeOverride, ProbeResult, WorkflowKind};

/// Probes workflow run history for one account's repositories.
pub struct WorkflowProber<'a> {
    client: &'a GitHubClient,
    overrides: &'a [ProbeOverride],
}

impl<'a> WorkflowProber<'a> {
    pub fn new(client: &'a GitHubClient, overrides: &'a [ProbeOverride]) -> Self {
        Self { client, overrides }
    }

    /// Probe one workflow kind in one repository.
    ///
    /// An override hit returns the forced result without touching the API.
    /// Otherwise the run-history endpoint answers: 2xx means present,
    /// anything else means absent. Neither outcome is an error.
    pub async fn probe(&self, repo: &str, workflow: &WorkflowKind) -> Result<ProbeResult> {
        if let Some(forced) = self.forced_result(repo, &workflow.context) {
            debug!(
                "Probe override for {}/{}: forced {}",
                repo, workflow.context, forced
            );
            return Ok(ProbeResult {
                context: workflow.context.clone(),
                present: forced,
            });
        }

        let present = self.client.workflow_has_runs(repo, &workflow.file).await?;
        Ok(ProbeResult {
            context: workflow.context.clone(),
            present,
        })
    }

    /// Look up a forced result in the override table.
    fn forced_result(&self, repo: &str, context: &str) -> Option<bool> {
        self.overrides
            .iter()
            .find(|o| o.repository == repo && o.context == context)
            .map(|o| o.present)
    }
}
