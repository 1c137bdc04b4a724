use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::application::use_cases::branch_report::BranchReport;
use crate::common::error::WcError;
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Fast-forward pull in every working copy that has an upstream.
///
/// Local tracked changes are stashed first and re-applied afterwards, also
/// when the pull itself fails.
pub struct PullWithAutostash {
    summary: bool,
}

impl PullWithAutostash {
    pub fn new(summary: bool) -> Self {
        Self { summary }
    }
}

#[async_trait]
impl TreeCommand for PullWithAutostash {
    fn name(&self) -> &str {
        "pull"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        if node.upstream().await?.is_none() {
            tracing::debug!(path = %node.path().display(), "no upstream, not pulling");
            ctx.warn_once(
                "pull-no-upstream",
                "Working copies without an upstream branch are skipped",
            );
            return Ok(Flow::Continue);
        }

        let stash = node.stash_and_reset().await?;
        if let Some(stash) = &stash {
            ctx.diagnostic(&format!("Stashed local changes in {} as {}", node, stash));
        }

        let echo = ctx.echo().with_header(node.to_string());
        let pulled = node.pull(echo).await;

        if let Some(stash) = stash {
            if let Err(err) = node.apply_stash(&stash).await {
                return Err(WcError::internal_error(format!(
                    "Could not re-apply stash {} in {} ({}); recover it with 'git stash apply {}'",
                    stash,
                    node.path().display(),
                    err,
                    stash
                )));
            }
        }

        pulled?;
        Ok(Flow::Continue)
    }

    fn next_command(&mut self, _root: &Arc<WorkingCopy>) -> Option<Box<dyn TreeCommand>> {
        self.summary
            .then(|| Box::new(BranchReport::new()) as Box<dyn TreeCommand>)
    }
}
