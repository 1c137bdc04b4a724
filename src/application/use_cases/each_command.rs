use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;
use crate::infrastructure::process::{CommandLine, ProcessRun};

/// Runs a shell command inside every working copy
pub struct EachCommand {
    command: String,
}

impl EachCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Words given on the command line, joined the way a shell would see them
    pub fn from_words(words: &[String]) -> Self {
        Self::new(words.join(" "))
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl TreeCommand for EachCommand {
    fn name(&self) -> &str {
        "each"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        ctx.primary(&node.to_string());
        ProcessRun::new(CommandLine::shell(self.command.as_str()), node.path())
            .with_capture(false, true)
            .with_echo(true, true)
            .with_sink(ctx.sink())
            .run()
            .await?;
        Ok(Flow::Continue)
    }

    fn wants_ambient_directory(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_joined() {
        let words = vec!["git".to_string(), "log".to_string(), "-1".to_string()];
        let each = EachCommand::from_words(&words);
        assert_eq!(each.command(), "git log -1");
        assert!(each.wants_ambient_directory());
    }
}
