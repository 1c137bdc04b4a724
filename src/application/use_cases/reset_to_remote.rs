use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{require_clean_tree, Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Hard-resets a local branch to the remote branch named by a list of
/// fragments, e.g. `foo bar` finds `remotes/Bar-Foo`.
pub struct ResetToRemote {
    fragments: Vec<String>,
    branch: String,
}

impl ResetToRemote {
    pub fn new(fragments: Vec<String>, branch: impl Into<String>) -> Self {
        Self {
            fragments,
            branch: branch.into(),
        }
    }
}

#[async_trait]
impl TreeCommand for ResetToRemote {
    fn name(&self) -> &str {
        "reset-to-remote"
    }

    async fn prepare(&mut self, root: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        require_clean_tree(root, ctx).await
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        if !node.has_branch(&self.branch).await? {
            ctx.diagnostic(&format!(
                "{} does not have a {} branch, skipping",
                node, self.branch
            ));
            return Ok(Flow::Continue);
        }

        let remote = match node.remote_branch_for(&self.fragments).await? {
            Some(remote) => remote,
            None => {
                ctx.diagnostic(&format!(
                    "No remote branch matches {:?}, skipping {}",
                    self.fragments, node
                ));
                return Ok(Flow::Continue);
            }
        };

        let target = format!("remotes/{}", remote);
        let sink = ctx.sink();
        node.with_branch(&self.branch, sink.as_ref(), || async {
            ctx.diagnostic(&format!("Hard-resetting {} to {}", node, target));
            node.hard_reset(&target).await
        })
        .await?;

        Ok(Flow::Continue)
    }
}
