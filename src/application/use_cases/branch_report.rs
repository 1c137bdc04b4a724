use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;
use crate::infrastructure::git::repository::AheadBehind;

const BRANCH_COLUMN: usize = 10;

/// One line per working copy: description, local branch and what it tracks
/// (upstream with ahead/behind counts, or the svn branch for git-svn clones).
#[derive(Debug, Default)]
pub struct BranchReport {
    width: usize,
    descriptions: HashMap<PathBuf, String>,
}

impl BranchReport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn tracking(node: &WorkingCopy) -> WcResult<String> {
        if let Some(upstream) = node.upstream().await? {
            let counts = node.ahead_behind().await?;
            return Ok(format_tracking(&upstream, counts));
        }
        if let Some(url) = node.svn_info_value("URL").await? {
            let svn_branch = url.rsplit('/').next().unwrap_or(url.as_str()).to_string();
            return Ok(format!("svn:{}", svn_branch));
        }
        Ok(String::new())
    }
}

pub fn format_tracking(upstream: &str, counts: AheadBehind) -> String {
    match (counts.ahead, counts.behind) {
        (0, 0) => upstream.to_string(),
        (ahead, 0) => format!("{} [ahead {}]", upstream, ahead),
        (0, behind) => format!("{} [behind {}]", upstream, behind),
        (ahead, behind) => format!("{} [ahead {}, behind {}]", upstream, ahead, behind),
    }
}

pub fn format_row(description: &str, width: usize, branch: &str, tracking: &str) -> String {
    format!(
        "{:<width$} {:<branch_width$} {}",
        description,
        branch,
        tracking,
        width = width,
        branch_width = BRANCH_COLUMN
    )
    .trim_end()
    .to_string()
}

#[async_trait]
impl TreeCommand for BranchReport {
    fn name(&self) -> &str {
        "branch"
    }

    async fn prepare(&mut self, root: &Arc<WorkingCopy>, _ctx: &RunContext) -> WcResult<Flow> {
        for node in root.self_and_descendants().await? {
            let description = node.describe().await?;
            self.width = self.width.max(description.chars().count());
            self.descriptions.insert(node.path().to_path_buf(), description);
        }
        Ok(Flow::Continue)
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        let description = match self.descriptions.get(node.path()) {
            Some(description) => description.clone(),
            None => node.describe().await?,
        };
        let branch = node.current_branch().await?;
        let tracking = Self::tracking(node).await?;
        ctx.primary(&format_row(&description, self.width, &branch, &tracking));
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_tracking() {
        let even = AheadBehind::default();
        assert_eq!(format_tracking("origin/master", even), "origin/master");
        assert_eq!(
            format_tracking("origin/master", AheadBehind { ahead: 2, behind: 0 }),
            "origin/master [ahead 2]"
        );
        assert_eq!(
            format_tracking("origin/master", AheadBehind { ahead: 0, behind: 5 }),
            "origin/master [behind 5]"
        );
        assert_eq!(
            format_tracking("origin/topic", AheadBehind { ahead: 1, behind: 3 }),
            "origin/topic [ahead 1, behind 3]"
        );
    }

    #[test]
    fn test_rows_are_aligned() {
        let rows = [
            format_row("<Working copy /r>", 22, "master", "origin/master"),
            format_row("<Working copy /r/lib *>", 22, "topic", ""),
        ];
        assert_eq!(rows[0], "<Working copy /r>      master     origin/master");
        assert_eq!(rows[1], "<Working copy /r/lib *> topic");
    }
}
