pub mod branch_match;
pub mod output_filter;

pub use branch_match::RemoteBranchMatcher;
pub use output_filter::{FilterAction, FilterRule, OutputFilter, OutputStream, RuleSet};
