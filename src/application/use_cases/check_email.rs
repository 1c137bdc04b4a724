use async_trait::async_trait;
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// Reports `user.email` of every working copy and optionally fills in a missing one
pub struct CheckEmail {
    add_missing: Option<String>,
}

impl CheckEmail {
    pub fn new(add_missing: Option<String>) -> Self {
        Self { add_missing }
    }
}

/// Anything without an `@` does not count as configured
pub fn is_configured(email: Option<&str>) -> bool {
    email.map_or(false, |email| email.contains('@'))
}

#[async_trait]
impl TreeCommand for CheckEmail {
    fn name(&self) -> &str {
        "check-email"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        let email = node.user_email().await?;
        if let Some(email) = email.as_deref().filter(|e| is_configured(Some(e))) {
            ctx.primary(&format!("{} {}", email, node.path().display()));
            return Ok(Flow::Continue);
        }

        ctx.primary(&format!("*** No e-mail configured in {}", node.path().display()));
        if let Some(add) = &self.add_missing {
            ctx.primary(&format!("--> Configuring {}", add));
            node.set_user_email(add).await?;
        }
        Ok(Flow::Continue)
    }
}
