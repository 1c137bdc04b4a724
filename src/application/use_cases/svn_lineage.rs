use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{check_git_svn, Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Maps git commits to svn revisions in every git-svn clone.
///
/// Without a revision it prints HEAD's commit, svn revision and svn URL;
/// with one it prints the commit that revision became.
pub struct SvnLineage {
    revision: Option<u64>,
}

impl SvnLineage {
    pub fn new(revision: Option<u64>) -> Self {
        Self { revision }
    }
}

#[async_trait]
impl TreeCommand for SvnLineage {
    fn name(&self) -> &str {
        "svn-lineage"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        if !check_git_svn(node, ctx).await? {
            return Ok(Flow::Continue);
        }

        if let Some(revision) = self.revision {
            let line = match node.commit_for_svn_revision(revision).await? {
                Some(commit) => format!("{} r{} {}", node, revision, commit),
                None => format!("{} r{} not found", node, revision),
            };
            ctx.primary(&line);
            return Ok(Flow::Continue);
        }

        let commit = node
            .head_commit()
            .await?
            .map(|commit| commit.short_id().to_string())
            .unwrap_or_else(|| "-".to_string());
        let revision = node
            .svn_revision_for_head()
            .await?
            .map(|revision| format!("r{}", revision))
            .unwrap_or_else(|| "-".to_string());
        let url = node.svn_info_value("URL").await?.unwrap_or_default();

        ctx.primary(&format!("{} {} {} {}", node, commit, revision, url).trim_end().to_string());
        Ok(Flow::Continue)
    }
}
