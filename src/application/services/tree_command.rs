use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;
use crate::infrastructure::console::OutputSink;
use crate::infrastructure::filesystem::config_store::ToolConfig;
use crate::infrastructure::git::repository::EchoOptions;

/// Whether a traversal goes on after a hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// State shared by every pass of one run
pub struct RunContext {
    sink: Arc<dyn OutputSink>,
    config: Arc<ToolConfig>,
    warned: Mutex<HashSet<String>>,
}

impl RunContext {
    pub fn new(sink: Arc<dyn OutputSink>, config: ToolConfig) -> Self {
        Self {
            sink,
            config: Arc::new(config),
            warned: Mutex::new(HashSet::new()),
        }
    }

    pub fn sink(&self) -> Arc<dyn OutputSink> {
        Arc::clone(&self.sink)
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn primary(&self, line: &str) {
        self.sink.primary(line);
    }

    pub fn diagnostic(&self, line: &str) {
        self.sink.diagnostic(line);
    }

    /// Print a diagnostic the first time `key` is seen during this run.
    /// Returns whether it was printed.
    pub fn warn_once(&self, key: &str, line: &str) -> bool {
        let first = match self.warned.lock() {
            Ok(mut warned) => warned.insert(key.to_string()),
            Err(_) => true,
        };
        if first {
            self.sink.diagnostic(line);
        }
        first
    }

    /// Echo options writing to this run's sink
    pub fn echo(&self) -> EchoOptions {
        EchoOptions::new(self.sink())
    }
}

/// An operation applied to every working copy of a tree.
///
/// One instance serves one traversal. `prepare` sees the root before the walk,
/// `invoke` every node in pre-order, and `next_command` may hand the same root
/// to a follow-up command once the walk is done.
#[async_trait]
pub trait TreeCommand: Send {
    fn name(&self) -> &str;

    async fn prepare(&mut self, _root: &Arc<WorkingCopy>, _ctx: &RunContext) -> WcResult<Flow> {
        Ok(Flow::Continue)
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow>;

    fn next_command(&mut self, _root: &Arc<WorkingCopy>) -> Option<Box<dyn TreeCommand>> {
        None
    }

    /// Run `invoke` with the process working directory set to the node
    fn wants_ambient_directory(&self) -> bool {
        false
    }
}

/// Stop unless every working copy in the tree is clean; lists the dirty ones
pub async fn require_clean_tree(root: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
    let dirty = root.dirty_nodes().await?;
    if dirty.is_empty() {
        return Ok(Flow::Continue);
    }

    ctx.diagnostic("Dirty working copies found, please commit or stash first:");
    for node in dirty {
        ctx.diagnostic(&format!("<Working copy {} *>", node.path().display()));
    }
    Ok(Flow::Stop)
}

/// `true` for git-svn clones; otherwise reports the node as skipped
pub async fn check_git_svn(node: &WorkingCopy, ctx: &RunContext) -> WcResult<bool> {
    if node.is_git_svn().await? {
        return Ok(true);
    }
    ctx.diagnostic(&format!("{} is not git-svn, skipping", node));
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::console::MemorySink;

    #[test]
    fn test_warn_once_per_key() {
        let sink = Arc::new(MemorySink::new());
        let ctx = RunContext::new(sink.clone(), ToolConfig::default());

        assert!(ctx.warn_once("no-upstream", "some nodes have no upstream"));
        assert!(!ctx.warn_once("no-upstream", "some nodes have no upstream"));
        assert!(ctx.warn_once("other", "other warning"));

        assert_eq!(
            sink.combined(),
            vec!["some nodes have no upstream", "other warning"]
        );
    }

    #[test]
    fn test_separate_runs_warn_again() {
        let sink = Arc::new(MemorySink::new());
        let first = RunContext::new(sink.clone(), ToolConfig::default());
        let second = RunContext::new(sink.clone(), ToolConfig::default());

        assert!(first.warn_once("key", "warning"));
        assert!(second.warn_once("key", "warning"));
        assert_eq!(sink.combined().len(), 2);
    }
}
