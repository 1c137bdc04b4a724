use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::{ResultExt, WcResult};
use crate::domain::entities::working_copy::WorkingCopy;

/// A node whose `invoke` failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub command: String,
    pub path: PathBuf,
    pub message: String,
}

/// What happened during a run, across all chained passes
#[derive(Debug, Clone, Default)]
pub struct TraversalReport {
    /// Command names in the order they ran
    pub passes: Vec<String>,

    /// Invocations, counted over all passes
    pub visited: usize,

    /// Nodes skipped because a branch could not be resolved
    pub skipped: Vec<PathBuf>,

    pub failed: Vec<NodeFailure>,

    /// A `prepare` hook refused to run
    pub prepare_stopped: bool,

    /// An `invoke` hook ended its walk early
    pub stopped_early: bool,
}

impl TraversalReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.prepare_stopped
    }
}

/// Restores the previous process working directory on drop
#[derive(Debug)]
pub struct ScopedWorkingDirectory {
    previous: PathBuf,
}

impl ScopedWorkingDirectory {
    pub fn enter(path: &Path) -> WcResult<Self> {
        let previous = std::env::current_dir()
            .with_filesystem_error("Cannot determine current directory", None)?;
        std::env::set_current_dir(path).with_filesystem_error(
            "Cannot change into working copy",
            Some(path.to_path_buf()),
        )?;
        Ok(Self { previous })
    }
}

impl Drop for ScopedWorkingDirectory {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(path = %self.previous.display(), "cannot restore working directory: {}", err);
        }
    }
}

/// Walks a working-copy tree with a command and whatever it chains to
pub struct Traversal {
    ctx: RunContext,
}

impl Traversal {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub async fn run(
        &self,
        root: &Arc<WorkingCopy>,
        command: Box<dyn TreeCommand>,
    ) -> WcResult<TraversalReport> {
        let mut report = TraversalReport::default();
        let mut next = Some(command);

        while let Some(mut command) = next.take() {
            tracing::info!(command = command.name(), root = %root.path().display(), "starting traversal");
            report.passes.push(command.name().to_string());

            if command.prepare(root, &self.ctx).await? == Flow::Stop {
                tracing::info!(command = command.name(), "preparation stopped the run");
                report.prepare_stopped = true;
                break;
            }

            self.walk(root, command.as_mut(), &mut report).await;

            next = command.next_command(root);
            if let Some(follow_up) = &next {
                tracing::info!(from = command.name(), to = follow_up.name(), "chaining command");
            }
        }

        Ok(report)
    }

    async fn walk(
        &self,
        root: &Arc<WorkingCopy>,
        command: &mut dyn TreeCommand,
        report: &mut TraversalReport,
    ) {
        let mut stack = vec![Arc::clone(root)];

        while let Some(node) = stack.pop() {
            report.visited += 1;

            let outcome = if command.wants_ambient_directory() {
                match ScopedWorkingDirectory::enter(node.path()) {
                    Ok(_guard) => command.invoke(&node, &self.ctx).await,
                    Err(err) => Err(err),
                }
            } else {
                command.invoke(&node, &self.ctx).await
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => {
                    report.stopped_early = true;
                    break;
                }
                Err(err) if err.is_skippable() => {
                    self.ctx.diagnostic(&format!("{}, skipping {}", err, node));
                    report.skipped.push(node.path().to_path_buf());
                }
                Err(err) => {
                    self.ctx.diagnostic(&format!("{}: {}", node, err));
                    report.failed.push(NodeFailure {
                        command: command.name().to_string(),
                        path: node.path().to_path_buf(),
                        message: err.to_string(),
                    });
                }
            }

            match node.children().await {
                Ok(children) => stack.extend(children.into_iter().rev()),
                Err(err) => {
                    self.ctx.diagnostic(&format!("{}: cannot list nested working copies: {}", node, err));
                    report.failed.push(NodeFailure {
                        command: command.name().to_string(),
                        path: node.path().to_path_buf(),
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}
