use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Where HEAD forked off a given branch, per working copy
pub struct ForkPointReport {
    branch: String,
}

impl ForkPointReport {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
        }
    }
}

#[async_trait]
impl TreeCommand for ForkPointReport {
    fn name(&self) -> &str {
        "fork-point"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        match node.fork_point(&self.branch).await? {
            Some(commit) => ctx.primary(&format!("{} {}", node, commit)),
            None => ctx.diagnostic(&format!(
                "{} has no common history with {}",
                node, self.branch
            )),
        }
        Ok(Flow::Continue)
    }
}
