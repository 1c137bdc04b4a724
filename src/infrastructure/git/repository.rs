use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::error::WcError;
use crate::common::result::WcResult;
use crate::domain::value_objects::output_filter::OutputFilter;
use crate::infrastructure::console::OutputSink;
use crate::infrastructure::process::{CommandLine, ProcessOutput, ProcessRun};

/// Parsed `git branch -a`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchListing {
    /// Branch marked with `* `
    pub current: String,
    /// Every listed name, `remotes/` entries included, aliases stripped
    pub names: Vec<String>,
}

impl BranchListing {
    /// Names under `remotes/` with that prefix removed
    pub fn remote_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter_map(|name| name.strip_prefix("remotes/"))
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, branch: &str) -> bool {
        self.names.iter().any(|name| name == branch)
    }
}

/// One line of `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub flags: String,
    pub path: String,
}

impl StatusEntry {
    pub fn is_untracked(&self) -> bool {
        self.flags.starts_with('?')
    }
}

/// Commits on either side of `@{upstream}...HEAD`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub time: DateTime<Utc>,
}

impl CommitInfo {
    pub fn short_id(&self) -> &str {
        self.id.get(..10).unwrap_or(&self.id)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.time)
    }
}

/// Where and how a mutating git command shows its output
#[derive(Clone)]
pub struct EchoOptions {
    pub sink: Arc<dyn OutputSink>,
    pub filter: Option<OutputFilter>,
    pub header: Option<String>,
}

impl EchoOptions {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            filter: None,
            header: None,
        }
    }

    pub fn with_filter(mut self, filter: OutputFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// git operations bound to one working copy directory
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
    git_executable: String,
}

impl GitRepository {
    pub fn new(path: impl AsRef<Path>, git_executable: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            git_executable: git_executable.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A captured, silent git invocation in this working copy
    pub fn command(&self, args: &[&str]) -> ProcessRun {
        let argv = std::iter::once(self.git_executable.as_str())
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect::<Vec<_>>();
        ProcessRun::new(CommandLine::Argv(argv), &self.path)
    }

    async fn execute_git_command(&self, args: &[&str]) -> WcResult<ProcessOutput> {
        self.command(args).with_check_exit_code(false).run().await
    }

    async fn execute_git_command_checked(&self, args: &[&str]) -> WcResult<ProcessOutput> {
        self.command(args).run().await
    }

    async fn execute_git_command_echoed(&self, args: &[&str], echo: EchoOptions) -> WcResult<()> {
        let mut run = self
            .command(args)
            .with_capture(false, true)
            .with_echo(true, true)
            .with_sink(echo.sink);
        if let Some(filter) = echo.filter {
            run = run.with_filter(filter);
        }
        if let Some(header) = echo.header {
            run = run.with_header(header);
        }
        run.run().await.map(|_| ())
    }

    fn describe_command(&self, args: &[&str]) -> String {
        format!("{} {}", self.git_executable, args.join(" "))
    }

    /// Cheap check that the directory belongs to a git working copy
    pub async fn is_working_copy(&self) -> WcResult<bool> {
        let output = self.execute_git_command(&["rev-parse", "--git-dir"]).await?;
        Ok(output.success())
    }

    // ---- queries ----

    pub async fn branch_listing(&self) -> WcResult<BranchListing> {
        let args = ["branch", "-a"];
        let output = self.execute_git_command_checked(&args).await?;
        parse_branch_listing(&output.stdout)
            .ok_or_else(|| WcError::parse_error(self.describe_command(&args), output.stdout_text()))
    }

    pub async fn current_branch(&self) -> WcResult<String> {
        Ok(self.branch_listing().await?.current)
    }

    pub async fn branch_names(&self) -> WcResult<Vec<String>> {
        Ok(self.branch_listing().await?.names)
    }

    pub async fn remote_branch_names(&self) -> WcResult<Vec<String>> {
        Ok(self.branch_listing().await?.remote_names())
    }

    pub async fn has_branch(&self, branch: &str) -> WcResult<bool> {
        Ok(self.branch_listing().await?.contains(branch))
    }

    pub async fn status_entries(&self) -> WcResult<Vec<StatusEntry>> {
        let args = ["status", "--porcelain"];
        let output = self.execute_git_command_checked(&args).await?;
        output
            .stdout
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| {
                parse_status_line(line).ok_or_else(|| {
                    WcError::parse_error(self.describe_command(&args), line.clone())
                })
            })
            .collect()
    }

    /// Tracked changes make a working copy dirty, untracked files do not
    pub async fn is_dirty(&self) -> WcResult<bool> {
        Ok(self
            .status_entries()
            .await?
            .iter()
            .any(|entry| !entry.is_untracked()))
    }

    pub async fn upstream(&self) -> WcResult<Option<String>> {
        let output = self
            .execute_git_command(&[
                "rev-parse",
                "--abbrev-ref",
                "--symbolic-full-name",
                "@{upstream}",
            ])
            .await?;
        Ok(output
            .first_line()
            .filter(|line| output.success() && !line.is_empty())
            .map(str::to_string))
    }

    pub async fn ahead_behind(&self) -> WcResult<AheadBehind> {
        let args = ["rev-list", "--left-right", "--count", "@{upstream}...HEAD"];
        let output = self.execute_git_command_checked(&args).await?;
        output
            .first_line()
            .and_then(parse_ahead_behind)
            .ok_or_else(|| WcError::parse_error(self.describe_command(&args), output.stdout_text()))
    }

    /// `None` for a repository without commits
    pub async fn head_commit(&self) -> WcResult<Option<CommitInfo>> {
        let args = ["log", "-1", "--format=%H%x09%ct"];
        let output = self.execute_git_command(&args).await?;
        if !output.success() {
            return Ok(None);
        }
        output
            .first_line()
            .and_then(parse_commit_line)
            .map(Some)
            .ok_or_else(|| WcError::parse_error(self.describe_command(&args), output.stdout_text()))
    }

    pub async fn tags_at_head(&self) -> WcResult<Vec<String>> {
        let output = self
            .execute_git_command_checked(&["tag", "--points-at", "HEAD"])
            .await?;
        Ok(non_empty_lines(&output.stdout))
    }

    /// Fork point of HEAD against `other`, falling back to the plain merge base
    pub async fn fork_point(&self, other: &str) -> WcResult<Option<String>> {
        for args in [
            vec!["merge-base", "--fork-point", other, "HEAD"],
            vec!["merge-base", other, "HEAD"],
        ] {
            let output = self.execute_git_command(&args).await?;
            if let Some(id) = output.first_line().filter(|_| output.success()) {
                if !id.is_empty() {
                    return Ok(Some(id.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// `git svn info` as a key/value map, `None` when this is not a git-svn clone
    pub async fn svn_info(&self) -> WcResult<Option<BTreeMap<String, String>>> {
        let output = self.execute_git_command(&["svn", "info"]).await?;
        if !output.success() {
            return Ok(None);
        }
        Ok(Some(parse_svn_info(&output.stdout)))
    }

    pub async fn svn_revision_for(&self, commit: &str) -> WcResult<Option<String>> {
        let output = self
            .execute_git_command_checked(&["svn", "find-rev", commit])
            .await?;
        Ok(output
            .first_line()
            .filter(|line| !line.is_empty())
            .map(str::to_string))
    }

    pub async fn commit_for_svn_revision(&self, revision: u64) -> WcResult<Option<String>> {
        let spec = format!("r{}", revision);
        let output = self
            .execute_git_command_checked(&["svn", "find-rev", &spec])
            .await?;
        Ok(output
            .first_line()
            .filter(|line| !line.is_empty())
            .map(str::to_string))
    }

    pub async fn user_email(&self) -> WcResult<Option<String>> {
        let output = self
            .execute_git_command(&["config", "user.email"])
            .await?;
        Ok(output
            .first_line()
            .filter(|line| output.success() && !line.is_empty())
            .map(str::to_string))
    }

    pub async fn diff_lines(&self, extra_args: &[String]) -> WcResult<Vec<String>> {
        let mut args = vec!["diff", "--no-prefix"];
        args.extend(extra_args.iter().map(String::as_str));
        Ok(self.execute_git_command_checked(&args).await?.stdout)
    }

    // ---- mutations ----

    pub async fn switch_to_branch(&self, branch: &str) -> WcResult<()> {
        if !self.has_branch(branch).await? {
            return Err(WcError::no_such_branch(&self.path, branch));
        }
        self.checkout(branch).await
    }

    /// `git checkout` without the branch existence check, also takes commit ids
    pub async fn checkout(&self, target: &str) -> WcResult<()> {
        self.execute_git_command_checked(&["checkout", target])
            .await
            .map(|_| ())
    }

    pub async fn hard_reset(&self, target: &str) -> WcResult<()> {
        self.execute_git_command_checked(&["reset", "--hard", target])
            .await
            .map(|_| ())
    }

    /// Record tracked changes as a stash commit and reset to HEAD.
    /// Returns the stash commit, or `None` when there was nothing to stash.
    pub async fn stash_and_reset(&self) -> WcResult<Option<String>> {
        let output = self.execute_git_command_checked(&["stash", "create"]).await?;
        let stash = match output.first_line().filter(|line| !line.is_empty()) {
            Some(id) => id.to_string(),
            None => return Ok(None),
        };
        self.execute_git_command_checked(&["reset", "--hard"]).await?;
        Ok(Some(stash))
    }

    pub async fn apply_stash(&self, stash: &str) -> WcResult<()> {
        self.execute_git_command_checked(&["stash", "apply", stash])
            .await
            .map(|_| ())
    }

    pub async fn fetch(&self, echo: EchoOptions) -> WcResult<()> {
        self.execute_git_command_echoed(&["fetch", "--prune"], echo)
            .await
    }

    pub async fn pull(&self, echo: EchoOptions) -> WcResult<()> {
        self.execute_git_command_echoed(&["pull", "--ff-only"], echo)
            .await
    }

    pub async fn status(&self, echo: EchoOptions) -> WcResult<()> {
        self.execute_git_command_echoed(&["status"], echo).await
    }

    pub async fn svn_rebase(&self, echo: EchoOptions) -> WcResult<()> {
        self.execute_git_command_echoed(&["svn", "rebase"], echo)
            .await
    }

    pub async fn set_user_email(&self, email: &str) -> WcResult<()> {
        self.execute_git_command_checked(&["config", "user.email", email])
            .await
            .map(|_| ())
    }
}

fn non_empty_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exactly one line must carry the `* ` marker
pub fn parse_branch_listing(lines: &[String]) -> Option<BranchListing> {
    let mut current = Vec::new();
    let mut names = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let (is_current, rest) = match line.strip_prefix("* ") {
            Some(rest) => (true, rest),
            None => (false, line.trim_start()),
        };
        let name = rest.split(" -> ").next().unwrap_or(rest).trim().to_string();
        if is_current {
            current.push(name.clone());
        }
        names.push(name);
    }

    match current.as_slice() {
        [branch] => Some(BranchListing {
            current: branch.clone(),
            names,
        }),
        _ => None,
    }
}

/// First three characters are flags, the rest (quotes stripped) is the path
pub fn parse_status_line(line: &str) -> Option<StatusEntry> {
    let flags = line.get(..3)?;
    let path = line.get(3..)?.trim().trim_matches('"');
    if path.is_empty() {
        return None;
    }
    Some(StatusEntry {
        flags: flags.to_string(),
        path: path.to_string(),
    })
}

/// `<behind>\t<ahead>` as printed for `@{upstream}...HEAD`
pub fn parse_ahead_behind(line: &str) -> Option<AheadBehind> {
    let mut counts = line.split_whitespace().map(str::parse::<u32>);
    let behind = counts.next()?.ok()?;
    let ahead = counts.next()?.ok()?;
    if counts.next().is_some() {
        return None;
    }
    Some(AheadBehind { ahead, behind })
}

/// `%H%x09%ct`
pub fn parse_commit_line(line: &str) -> Option<CommitInfo> {
    let (id, timestamp) = line.split_once('\t')?;
    let seconds = timestamp.trim().parse::<i64>().ok()?;
    let time = Utc.timestamp_opt(seconds, 0).single()?;
    Some(CommitInfo {
        id: id.to_string(),
        time,
    })
}

/// `Key: Value` lines; the key runs up to the first colon
pub fn parse_svn_info(lines: &[String]) -> BTreeMap<String, String> {
    lines
        .iter()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let value = value.strip_prefix(' ')?;
            (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}
