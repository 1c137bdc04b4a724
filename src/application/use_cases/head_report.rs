use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::application::services::tree_command::{Flow, RunContext, TreeCommand};
use crate::common::result::WcResult;
use crate::domain::entities::working_copy::WorkingCopy;

/// HEAD commit, its age and the tags on it, per working copy
#[derive(Debug, Default)]
pub struct HeadReport;

impl HeadReport {
    pub fn new() -> Self {
        Self
    }
}

pub fn format_age(age: Duration) -> String {
    let (count, unit) = if age.num_days() >= 1 {
        (age.num_days(), "day")
    } else if age.num_hours() >= 1 {
        (age.num_hours(), "hour")
    } else if age.num_minutes() >= 1 {
        (age.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

#[async_trait]
impl TreeCommand for HeadReport {
    fn name(&self) -> &str {
        "head"
    }

    async fn invoke(&mut self, node: &Arc<WorkingCopy>, ctx: &RunContext) -> WcResult<Flow> {
        let commit = match node.head_commit().await? {
            Some(commit) => commit,
            None => {
                ctx.primary(&format!("{} (no commits)", node));
                return Ok(Flow::Continue);
            }
        };

        let tags = node.tags_at_head().await?;
        let mut line = format!(
            "{} {} {}",
            node,
            commit.short_id(),
            format_age(commit.age(Utc::now()))
        );
        if !tags.is_empty() {
            line.push_str(&format!(" ({})", tags.join(", ")));
        }
        ctx.primary(&line);
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(30)), "just now");
        assert_eq!(format_age(Duration::seconds(-5)), "just now");
        assert_eq!(format_age(Duration::minutes(1)), "1 minute ago");
        assert_eq!(format_age(Duration::minutes(59)), "59 minutes ago");
        assert_eq!(format_age(Duration::hours(5)), "5 hours ago");
        assert_eq!(format_age(Duration::days(1)), "1 day ago");
        assert_eq!(format_age(Duration::days(400)), "400 days ago");
    }
}
