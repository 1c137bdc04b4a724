use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{check_git_svn, Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Prints the diff of the first git-svn clone in the shape `svn diff` uses,
/// then stops the traversal.
pub struct SvnDiff {
    git_diff_args: Vec<String>,
}

impl SvnDiff {
    pub fn new(git_diff_args: Vec<String>) -> Self {
        Self { git_diff_args }
    }
}

/// Rewrites `git diff --no-prefix` output: `index` lines become `Index: PATH`
/// plus a separator, and the file header lines are annotated with the svn
/// revision and `working copy`.
pub fn rewrite_as_svn_diff(lines: &[String], revision: &str) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len() + lines.len() / 8);
    let mut current_path = String::new();
    let mut in_file_header = false;

    for line in lines {
        if let Some(paths) = line.strip_prefix("diff --git ") {
            current_path = diff_path(paths).to_string();
            in_file_header = true;
            output.push(line.clone());
        } else if line.starts_with("@@") {
            in_file_header = false;
            output.push(line.clone());
        } else if in_file_header && line.starts_with("index ") {
            output.push(format!("Index: {}", current_path));
            output.push("=".repeat(67));
        } else if in_file_header && line.starts_with("--- ") {
            output.push(format!("{}\t(revision {})", line, revision));
        } else if in_file_header && line.starts_with("+++ ") {
            output.push(format!("{}\t(working copy)", line));
        } else {
            output.push(line.clone());
        }
    }

    output
}

/// `PATH PATH` with both halves equal; falls back to the first word
fn diff_path(paths: &str) -> &str {
    let half = paths.len() / 2;
    if paths.len() % 2 == 1 && paths.get(half..half + 1) == Some(" ") {
        if let (Some(left), Some(right)) = (paths.get(..half), paths.get(half + 1..)) {
            if left == right {
                return left;
            }
        }
    }
    paths.split(' ').next().unwrap_or(paths)
}

#[async_trait]
impl TreeCommand for SvnDiff {
    fn name(&self) -> &str {
        "svn-diff"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        if !check_git_svn(node, ctx).await? {
            return Ok(Flow::Stop);
        }

        let revision = node
            .svn_info_value("Last Changed Rev")
            .await?
            .unwrap_or_else(|| "unknown".to_string());
        let diff = node.repository().diff_lines(&self.git_diff_args).await?;

        for line in rewrite_as_svn_diff(&diff, &revision) {
            ctx.primary(&line);
        }
        Ok(Flow::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_rewrite_as_svn_diff() {
        let diff = lines(
            "diff --git src/main.c src/main.c\n\
             index 3b18e51..a3c2d4f 100644\n\
             --- src/main.c\n\
             +++ src/main.c\n\
             @@ -1,2 +1,2 @@\n\
             -int x;\n\
             --- a removed line that looks like a header\n\
             +int y;\n",
        );

        let rewritten = rewrite_as_svn_diff(&diff, "1234");
        assert_eq!(
            rewritten,
            vec![
                "diff --git src/main.c src/main.c".to_string(),
                "Index: src/main.c".to_string(),
                "=".repeat(67),
                "--- src/main.c\t(revision 1234)".to_string(),
                "+++ src/main.c\t(working copy)".to_string(),
                "@@ -1,2 +1,2 @@".to_string(),
                "-int x;".to_string(),
                "--- a removed line that looks like a header".to_string(),
                "+int y;".to_string(),
            ]
        );
    }

    #[test]
    fn test_paths_with_spaces() {
        assert_eq!(diff_path("a dir/file a dir/file"), "a dir/file");
        assert_eq!(diff_path("old new"), "old");
    }

    #[test]
    fn test_empty_diff() {
        assert!(rewrite_as_svn_diff(&[], "1").is_empty());
    }
}
