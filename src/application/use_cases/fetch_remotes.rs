use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::application::use_cases::branch_report::BranchReport;
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;
use crate::domain::value_objects::output_filter::{OutputFilter, RuleSet};

/// `git fetch --prune` everywhere, then a branch summary unless disabled
pub struct FetchRemotes {
    filter: OutputFilter,
    summary: bool,
}

impl FetchRemotes {
    pub fn new(rules: RuleSet, summary: bool) -> Self {
        Self {
            filter: OutputFilter::new(rules),
            summary,
        }
    }
}

#[async_trait]
impl TreeCommand for FetchRemotes {
    fn name(&self) -> &str {
        "fetch"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        let echo = ctx
            .echo()
            .with_filter(self.filter.clone())
            .with_header(node.to_string());
        node.fetch(echo).await?;
        Ok(Flow::Continue)
    }

    fn next_command(&mut self, _root: &Arc<WorkingCopy>) -> Option<Box<dyn TreeCommand>> {
        if self.summary {
            Some(Box::new(BranchReport::new()))
        } else {
            None
        }
    }
}

