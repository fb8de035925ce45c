//! Cleanup orchestrator
//!
//! Runs one container cleanup end to end: resolve the container by name,
//! fetch the entity listings, plan mutations, and execute them in order.
//! A failure on one entity is logged and the batch continues; only the
//! container lookup and the listing calls are fatal.

use log::{info, warn};
use serde::Serialize;
use tagman_client_core::api::ContainerApi;
use tagman_client_core::error::{Error, Result};
use tagman_client_core::planner::{self, Action, CleanupPolicy};

/// Outcome counters for one cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Resolved container id.
    pub container_id: String,
    /// Actions the planner produced.
    pub planned: usize,
    /// Actions that completed against the API.
    pub executed: usize,
    /// Actions that failed and were skipped.
    pub failed: usize,
}

/// Drives a [`CleanupPolicy`] against one account/container pair.
pub struct CleanupOrchestrator<C> {
    client: C,
    policy: CleanupPolicy,
    dry_run: bool,
}

impl<C: ContainerApi> CleanupOrchestrator<C> {
    pub fn new(client: C, policy: CleanupPolicy) -> Self {
        Self {
            client,
            policy,
            dry_run: false,
        }
    }

    /// Plan and report without calling any mutation endpoint.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, account_id: &str, container_name: &str) -> Result<CleanupReport> {
        let container_id = self
            .client
            .find_container_id(account_id, container_name)
            .await?
            .ok_or_else(|| Error::ContainerNotFound {
                name: container_name.to_string(),
            })?;
        info!("container '{container_name}' resolved to id {container_id}");

        let tags = self.client.list_tags(account_id, &container_id).await?;
        let triggers = self.client.list_triggers(account_id, &container_id).await?;
        let variables = self.client.list_variables(account_id, &container_id).await?;
        info!(
            "fetched {} tags, {} triggers, {} variables",
            tags.len(),
            triggers.len(),
            variables.len()
        );

        let actions = planner::plan(&self.policy, &tags, &triggers, &variables);
        let mut report = CleanupReport {
            container_id: container_id.clone(),
            planned: actions.len(),
            ..Default::default()
        };

        for action in &actions {
            if self.dry_run {
                info!("would {}", action.describe());
                continue;
            }
            match self.execute(account_id, &container_id, action).await {
                Ok(()) => {
                    info!("{}: done", action.describe());
                    report.executed += 1;
                }
                Err(err) => {
                    // Keep going; the remaining entities are unrelated.
                    warn!("{}: {err}", action.describe());
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn execute(&self, account_id: &str, container_id: &str, action: &Action) -> Result<()> {
        match action {
            Action::DeleteTrigger { trigger_id } => {
                self.client
                    .delete_trigger(account_id, container_id, trigger_id)
                    .await
            }
            Action::DeleteVariable { variable_id } => {
                self.client
                    .delete_variable(account_id, container_id, variable_id)
                    .await
            }
            Action::DeleteTag { tag_id } => {
                self.client.delete_tag(account_id, container_id, tag_id).await
            }
            Action::UpdateTag { tag } => self
                .client
                .update_tag(account_id, container_id, tag)
                .await
                .map(|_| ()),
        }
    }
}
