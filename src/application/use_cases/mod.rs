//! The commands a traversal can run
pub mod branch_report;
pub mod check_email;
pub mod checkout_branch;
pub mod each_command;
pub mod fetch_remotes;
pub mod fork_point;
pub mod head_report;
pub mod pull_with_autostash;
pub mod reset_to_remote;
pub mod status_report;
pub mod svn_diff;
pub mod svn_lineage;
pub mod svn_rebase;
pub mod tree_listing;

pub use branch_report::BranchReport;
pub use check_email::CheckEmail;
pub use checkout_branch::CheckoutBranch;
pub use each_command::EachCommand;
pub use fetch_remotes::FetchRemotes;
pub use fork_point::ForkPointReport;
pub use head_report::HeadReport;
pub use pull_with_autostash::PullWithAutostash;
pub use reset_to_remote::ResetToRemote;
pub use status_report::StatusReport;
pub use svn_diff::SvnDiff;
pub use svn_lineage::SvnLineage;
pub use svn_rebase::SvnRebase;
pub use tree_listing::TreeListing;
