use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{
    check_git_svn, require_clean_tree, Flow, RunContext, TreeCommand,
};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

const REBASE_BRANCH: &str = "master";

/// `git svn rebase` on `master` of every git-svn clone
#[derive(Debug, Default)]
pub struct SvnRebase;

impl SvnRebase {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TreeCommand for SvnRebase {
    fn name(&self) -> &str {
        "svn-rebase"
    }

    async fn prepare(&mut self, root: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        require_clean_tree(root, ctx).await
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        if !check_git_svn(node, ctx).await? {
            return Ok(Flow::Continue);
        }
        if !node.has_branch(REBASE_BRANCH).await? {
            ctx.diagnostic(&format!(
                "{} does not have a {} branch, skipping",
                node, REBASE_BRANCH
            ));
            return Ok(Flow::Continue);
        }

        let sink = ctx.sink();
        node.with_branch(REBASE_BRANCH, sink.as_ref(), || async {
            ctx.primary(&node.to_string());
            node.svn_rebase(ctx.echo()).await
        })
        .await?;

        Ok(Flow::Continue)
    }
}
