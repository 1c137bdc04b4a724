use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::common::error::WcError;
use crate::common::result::{WcResult, WcResultExt};
use crate::domain::value_objects::branch_match::RemoteBranchMatcher;
use crate::infrastructure::console::OutputSink;
use crate::infrastructure::filesystem::config_store::ToolConfig;
use crate::infrastructure::filesystem::discovery::discover_child_paths;
use crate::infrastructure::filesystem::discovery_cache::DiscoveryCache;
use crate::infrastructure::git::repository::{
    AheadBehind, CommitInfo, EchoOptions, GitRepository, StatusEntry,
};

/// ツリー全体で共有する設定
#[derive(Debug, Clone)]
pub struct WorkingCopySettings {
    /// gitコマンドのパス
    pub git_executable: String,

    /// リポジトリのルートを示すディレクトリ名
    pub metadata_marker: String,

    /// ルートの子リストをキャッシュするか
    pub cache_enabled: bool,

    /// キャッシュの有効期間
    pub cache_max_age: Duration,

    /// 既存のキャッシュを捨てて再探索するか
    pub refresh_cache: bool,
}

impl Default for WorkingCopySettings {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

impl WorkingCopySettings {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            git_executable: config.git_executable.clone(),
            metadata_marker: config.metadata_marker.clone(),
            cache_enabled: config.cache.enabled,
            cache_max_age: config.cache.max_age(),
            refresh_cache: false,
        }
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_refresh_cache(mut self, refresh: bool) -> Self {
        self.refresh_cache = refresh;
        self
    }
}

/// A git working copy inside a tree of nested working copies.
///
/// The tree owns its nodes top-down: children are discovered on first access
/// and kept for the lifetime of the node, parents are held weakly.
pub struct WorkingCopy {
    /// 正規化された絶対パス
    path: PathBuf,

    parent: Option<Weak<WorkingCopy>>,

    /// ルートからの深さ（ルートは0）
    depth: usize,

    repository: GitRepository,

    settings: Arc<WorkingCopySettings>,

    children: OnceCell<Vec<Arc<WorkingCopy>>>,

    svn_info: OnceCell<Option<BTreeMap<String, String>>>,
}

impl fmt::Debug for WorkingCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkingCopy")
            .field("path", &self.path)
            .field("depth", &self.depth)
            .finish()
    }
}

impl fmt::Display for WorkingCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Working copy {}>", self.path.display())
    }
}

impl WorkingCopy {
    /// Open the root of a tree. Fails with `NotARepository` unless `path` is
    /// inside a git working copy.
    pub async fn open(path: impl AsRef<Path>, settings: WorkingCopySettings) -> WcResult<Arc<Self>> {
        let requested = path.as_ref();
        let path = std::fs::canonicalize(requested)
            .map_err(|_| WcError::not_a_repository(requested))?;

        Self::try_build(path.clone(), None, 0, Arc::new(settings))
            .await?
            .map(Arc::new)
            .ok_or_else(|| WcError::not_a_repository(path))
    }

    async fn try_build(
        path: PathBuf,
        parent: Option<Weak<WorkingCopy>>,
        depth: usize,
        settings: Arc<WorkingCopySettings>,
    ) -> WcResult<Option<Self>> {
        if !path.is_dir() {
            return Ok(None);
        }

        let repository = GitRepository::new(&path, settings.git_executable.as_str());
        if !repository.is_working_copy().await? {
            return Ok(None);
        }

        Ok(Some(Self {
            path,
            parent,
            depth,
            repository,
            settings,
            children: OnceCell::new(),
            svn_info: OnceCell::new(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn repository(&self) -> &GitRepository {
        &self.repository
    }

    pub fn settings(&self) -> &WorkingCopySettings {
        &self.settings
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<Arc<WorkingCopy>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Nearest first
    pub fn ancestors(&self) -> Vec<Arc<WorkingCopy>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            ancestors.push(node);
        }
        ancestors
    }

    pub fn root(self: &Arc<Self>) -> Arc<WorkingCopy> {
        self.ancestors().pop().unwrap_or_else(|| Arc::clone(self))
    }

    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// `<Working copy PATH>`, with a trailing ` *` when dirty
    pub async fn describe(&self) -> WcResult<String> {
        let marker = if self.is_dirty().await? { " *" } else { "" };
        Ok(format!("<Working copy {}{}>", self.path.display(), marker))
    }

    // ---- tree ----

    pub async fn children(self: &Arc<Self>) -> WcResult<Vec<Arc<WorkingCopy>>> {
        let children = self
            .children
            .get_or_try_init(|| self.discover_children())
            .await?;
        Ok(children.clone())
    }

    /// This node followed by all descendants, depth-first pre-order
    pub async fn self_and_descendants(self: &Arc<Self>) -> WcResult<Vec<Arc<WorkingCopy>>> {
        let mut result = Vec::new();
        let mut stack = vec![Arc::clone(self)];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().await?.into_iter().rev());
            result.push(node);
        }
        Ok(result)
    }

    pub async fn dirty_nodes(self: &Arc<Self>) -> WcResult<Vec<Arc<WorkingCopy>>> {
        let mut dirty = Vec::new();
        for node in self.self_and_descendants().await? {
            if node.is_dirty().await? {
                dirty.push(node);
            }
        }
        Ok(dirty)
    }

    fn discovery_cache(&self) -> Option<DiscoveryCache> {
        let marker_dir = self.path.join(&self.settings.metadata_marker);
        (self.is_root() && self.settings.cache_enabled && marker_dir.is_dir()).then(|| {
            DiscoveryCache::for_root(
                &self.path,
                &self.settings.metadata_marker,
                self.settings.cache_max_age,
            )
        })
    }

    async fn discover_children(self: &Arc<Self>) -> WcResult<Vec<Arc<WorkingCopy>>> {
        let cache = self.discovery_cache();

        if let Some(cache) = &cache {
            if self.settings.refresh_cache {
                cache.invalidate().to_option_logged();
            } else if let Some(paths) = cache.load() {
                if let Some(children) = self.open_cached_children(paths).await? {
                    return Ok(children);
                }
                tracing::warn!(
                    path = %cache.path().display(),
                    "discovery cache lists a path that is no longer a working copy, rediscovering"
                );
                cache.invalidate().to_option_logged();
            }
        }

        let mut children = Vec::new();
        for path in discover_child_paths(&self.path, &self.settings.metadata_marker) {
            match self.open_child(path.clone()).await? {
                Some(child) => children.push(child),
                None => tracing::warn!(path = %path.display(), "skipping directory that is not a git working copy"),
            }
        }

        if let Some(cache) = &cache {
            let paths: Vec<PathBuf> = children.iter().map(|c| c.path.clone()).collect();
            cache.store(&paths).to_option_logged();
        }

        Ok(children)
    }

    /// `None` as soon as one cached path fails validation
    async fn open_cached_children(
        self: &Arc<Self>,
        paths: Vec<PathBuf>,
    ) -> WcResult<Option<Vec<Arc<WorkingCopy>>>> {
        let mut children = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.join(&self.settings.metadata_marker).exists() {
                return Ok(None);
            }
            match self.open_child(path).await? {
                Some(child) => children.push(child),
                None => return Ok(None),
            }
        }
        Ok(Some(children))
    }

    async fn open_child(self: &Arc<Self>, path: PathBuf) -> WcResult<Option<Arc<WorkingCopy>>> {
        let child = Self::try_build(
            path,
            Some(Arc::downgrade(self)),
            self.depth + 1,
            Arc::clone(&self.settings),
        )
        .await?;
        Ok(child.map(Arc::new))
    }

    // ---- queries ----

    pub async fn current_branch(&self) -> WcResult<String> {
        self.repository.current_branch().await
    }

    pub async fn branch_names(&self) -> WcResult<Vec<String>> {
        self.repository.branch_names().await
    }

    pub async fn remote_branch_names(&self) -> WcResult<Vec<String>> {
        self.repository.remote_branch_names().await
    }

    pub async fn has_branch(&self, branch: &str) -> WcResult<bool> {
        self.repository.has_branch(branch).await
    }

    /// Remote branch (without `remotes/`) whose name is made of `fragments`
    pub async fn remote_branch_for(&self, fragments: &[String]) -> WcResult<Option<String>> {
        let remotes = self.remote_branch_names().await?;
        RemoteBranchMatcher::new(fragments).resolve(remotes.iter().map(String::as_str))
    }

    pub async fn status_entries(&self) -> WcResult<Vec<StatusEntry>> {
        self.repository.status_entries().await
    }

    pub async fn is_dirty(&self) -> WcResult<bool> {
        self.repository.is_dirty().await
    }

    pub async fn upstream(&self) -> WcResult<Option<String>> {
        self.repository.upstream().await
    }

    pub async fn ahead_behind(&self) -> WcResult<AheadBehind> {
        self.repository.ahead_behind().await
    }

    pub async fn head_commit(&self) -> WcResult<Option<CommitInfo>> {
        self.repository.head_commit().await
    }

    pub async fn tags_at_head(&self) -> WcResult<Vec<String>> {
        self.repository.tags_at_head().await
    }

    pub async fn fork_point(&self, other: &str) -> WcResult<Option<String>> {
        self.repository.fork_point(other).await
    }

    pub async fn is_git_svn(&self) -> WcResult<bool> {
        Ok(self.svn_info_map().await?.is_some())
    }

    async fn svn_info_map(&self) -> WcResult<Option<&BTreeMap<String, String>>> {
        let info = self
            .svn_info
            .get_or_try_init(|| self.repository.svn_info())
            .await?;
        Ok(info.as_ref())
    }

    /// Parsed `git svn info`, computed once per node
    pub async fn svn_info(&self) -> WcResult<BTreeMap<String, String>> {
        self.svn_info_map()
            .await?
            .cloned()
            .ok_or_else(|| WcError::parse_error("git svn info", format!("{} is not a git-svn clone", self)))
    }

    pub async fn svn_info_value(&self, key: &str) -> WcResult<Option<String>> {
        Ok(self
            .svn_info_map()
            .await?
            .and_then(|info| info.get(key).cloned()))
    }

    pub async fn svn_revision_for_head(&self) -> WcResult<Option<String>> {
        self.repository.svn_revision_for("HEAD").await
    }

    pub async fn commit_for_svn_revision(&self, revision: u64) -> WcResult<Option<String>> {
        self.repository.commit_for_svn_revision(revision).await
    }

    pub async fn user_email(&self) -> WcResult<Option<String>> {
        self.repository.user_email().await
    }

    // ---- mutations ----

    pub async fn switch_to_branch(&self, branch: &str) -> WcResult<()> {
        self.repository.switch_to_branch(branch).await
    }

    pub async fn hard_reset(&self, target: &str) -> WcResult<()> {
        self.repository.hard_reset(target).await
    }

    pub async fn stash_and_reset(&self) -> WcResult<Option<String>> {
        self.repository.stash_and_reset().await
    }

    pub async fn apply_stash(&self, stash: &str) -> WcResult<()> {
        self.repository.apply_stash(stash).await
    }

    pub async fn fetch(&self, echo: EchoOptions) -> WcResult<()> {
        self.repository.fetch(echo).await
    }

    pub async fn pull(&self, echo: EchoOptions) -> WcResult<()> {
        self.repository.pull(echo).await
    }

    pub async fn svn_rebase(&self, echo: EchoOptions) -> WcResult<()> {
        self.repository.svn_rebase(echo).await
    }

    pub async fn set_user_email(&self, email: &str) -> WcResult<()> {
        self.repository.set_user_email(email).await
    }

    /// Run `f` with `branch` checked out, then go back to the previous branch
    /// (or commit, for a detached HEAD) whether `f` succeeded or not.
    pub async fn with_branch<F, Fut, T>(&self, branch: &str, sink: &dyn OutputSink, f: F) -> WcResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WcResult<T>>,
    {
        let original = self.current_branch().await?;
        if original == branch {
            return f().await;
        }

        let restore_target = if original.starts_with('(') {
            match self.head_commit().await? {
                Some(commit) => commit.id,
                None => return Err(WcError::parse_error("git log -1", format!("{} has no HEAD commit", self))),
            }
        } else {
            original.clone()
        };

        sink.diagnostic(&format!(
            "Temporarily switching {} from branch {} to {}",
            self, original, branch
        ));
        self.switch_to_branch(branch).await?;

        let result = f().await;

        sink.diagnostic(&format!("Switching {} back to branch {}", self, original));
        let restored = self.repository.checkout(&restore_target).await;

        match (result, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(restore_error)) => Err(restore_error),
            (Err(error), restored) => {
                if let Err(restore_error) = restored {
                    tracing::warn!("{}", restore_error);
                }
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_open_fails_outside_a_working_copy() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let result = WorkingCopy::open(temp_dir.path(), WorkingCopySettings::default()).await;
        assert!(matches!(result, Err(WcError::NotARepository { .. })));
    }

    #[tokio::test]
    async fn test_open_fails_for_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let result = WorkingCopy::open(&missing, WorkingCopySettings::default()).await;
        match result {
            Err(WcError::NotARepository { path }) => assert_eq!(path, missing),
            other => panic!("Expected NotARepository, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = ToolConfig::default();
        config.cache.max_age_hours = 2;
        config.metadata_marker = ".repo".to_string();

        let settings = WorkingCopySettings::from_config(&config)
            .with_cache_enabled(false)
            .with_refresh_cache(true);
        assert_eq!(settings.metadata_marker, ".repo");
        assert_eq!(settings.cache_max_age, Duration::from_secs(7200));
        assert!(!settings.cache_enabled);
        assert!(settings.refresh_cache);
    }
}
