use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;
use crate::domain::value_objects::output_filter::{OutputFilter, RuleSet};

/// `git status` in every working copy with the usual noise filtered out.
///
/// The node is printed as a header before its first remaining line, so clean
/// working copies produce no output at all.
pub struct StatusReport {
    filter: OutputFilter,
}

impl StatusReport {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            filter: OutputFilter::new(rules),
        }
    }
}

#[async_trait]
impl TreeCommand for StatusReport {
    fn name(&self) -> &str {
        "status"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        let echo = ctx
            .echo()
            .with_filter(self.filter.clone())
            .with_header(node.to_string());
        node.repository().status(echo).await?;
        Ok(Flow::Continue)
    }
}
