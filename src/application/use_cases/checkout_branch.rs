use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{require_clean_tree, Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Switches every working copy that has the branch; the others are skipped
pub struct CheckoutBranch {
    branch: String,
}

impl CheckoutBranch {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
        }
    }
}

#[async_trait]
impl TreeCommand for CheckoutBranch {
    fn name(&self) -> &str {
        "checkout"
    }

    async fn prepare(&mut self, root: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        require_clean_tree(root, ctx).await
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        if node.current_branch().await? == self.branch {
            return Ok(Flow::Continue);
        }
        // NoSuchBranch is reported by the traversal as a skip
        node.switch_to_branch(&self.branch).await?;
        ctx.primary(&format!("Switched {} to {}", node, self.branch));
        Ok(Flow::Continue)
    }
}
