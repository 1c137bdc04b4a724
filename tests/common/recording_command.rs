//! A command that records every hook call

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use wctree::application::services::{Flow, RunContext, TreeCommand};
use wctree::domain::entities::WorkingCopy;
use wctree::{Result, WcError};

/// Appends `name:prepare` and `name:<basename>` entries to a shared history.
/// Commands built with [`RecordingCommand::in_node_directory`] also append
/// `name:cwd:<current directory>` on each invocation.
pub struct RecordingCommand {
    name: String,
    history: Arc<Mutex<Vec<String>>>,
    stop_in_prepare: bool,
    stop_at: Option<usize>,
    fail_at: Vec<String>,
    next: Option<Box<RecordingCommand>>,
    invocations: usize,
    ambient: bool,
}

impl RecordingCommand {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            history: Arc::new(Mutex::new(Vec::new())),
            stop_in_prepare: false,
            stop_at: None,
            fail_at: Vec::new(),
            next: None,
            invocations: 0,
            ambient: false,
        }
    }

    pub fn history(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.history)
    }

    pub fn stopping_in_prepare(mut self) -> Self {
        self.stop_in_prepare = true;
        self
    }

    /// Return `Stop` from the n-th invocation (1-based)
    pub fn stopping_at(mut self, invocation: usize) -> Self {
        self.stop_at = Some(invocation);
        self
    }

    pub fn failing_at(mut self, basename: &str) -> Self {
        self.fail_at.push(basename.to_string());
        self
    }

    pub fn skipping_at(mut self, basename: &str) -> Self {
        self.fail_at.push(format!("skip:{}", basename));
        self
    }

    /// Ask the traversal to run each invocation inside the node's directory
    pub fn in_node_directory(mut self) -> Self {
        self.ambient = true;
        self
    }

    /// Chain to `next`, which shares this command's history
    pub fn followed_by(mut self, mut next: RecordingCommand) -> Self {
        next.history = Arc::clone(&self.history);
        self.next = Some(Box::new(next));
        self
    }

    fn record(&self, entry: String) {
        self.history.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl TreeCommand for RecordingCommand {
    fn name(&self) -> &str {
        &self.name
    }

    async fn prepare(&mut self, _root: &Arc<WorkingCopy>, _ctx: &RunContext) -> Result<Flow> {
        self.record(format!("{}:prepare", self.name));
        Ok(if self.stop_in_prepare {
            Flow::Stop
        } else {
            Flow::Continue
        })
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, _ctx: &RunContext) -> Result<Flow> {
        self.invocations += 1;
        let basename = node.basename();
        self.record(format!("{}:{}", self.name, basename));
        if self.ambient {
            let cwd = std::env::current_dir().unwrap();
            self.record(format!("{}:cwd:{}", self.name, cwd.display()));
        }

        if self.fail_at.contains(&basename) {
            return Err(WcError::command_failed("recorded", node.path(), 1, "boom"));
        }
        if self.fail_at.contains(&format!("skip:{}", basename)) {
            return Err(WcError::no_such_branch(node.path(), "feature"));
        }
        if self.stop_at == Some(self.invocations) {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn wants_ambient_directory(&self) -> bool {
        self.ambient
    }

    fn next_command(&mut self, _root: &Arc<WorkingCopy>) -> Option<Box<dyn TreeCommand>> {
        self.next.take().map(|next| next as Box<dyn TreeCommand>)
    }
}
