use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Prints the tree of nested working copies, indented by depth
#[derive(Debug, Default)]
pub struct TreeListing;

impl TreeListing {
    pub fn new() -> Self {
        Self
    }
}

pub fn tree_line(depth: usize, description: &str) -> String {
    format!("|{}{}", "--".repeat(depth), description)
}

#[async_trait]
impl TreeCommand for TreeListing {
    fn name(&self) -> &str {
        "tree"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        let description = node.describe().await?;
        ctx.primary(&tree_line(node.depth(), &description));
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_line_indentation() {
        assert_eq!(tree_line(0, "<Working copy /r>"), "|<Working copy /r>");
        assert_eq!(tree_line(2, "<Working copy /r/a/b *>"), "|----<Working copy /r/a/b *>");
    }
}
