use clap::Args;

use super::parse_args;
use crate::application::use_cases::ResetToRemote;
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct ResetToRemoteArgs {
    /// Local branch to reset
    #[arg(long, default_value = "master")]
    pub branch: String,

    /// Parts of the remote branch name. Every ordering joined with "-" is tried, ignoring case
    #[arg(required = true, num_args = 1.., value_name = "NAME")]
    pub remote_branch_names: Vec<String>,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "reset-to-remote",
        about: "Hard-reset a local branch of each working copy to a matching remote branch. Aborts if any working copy is dirty",
        configure: ResetToRemoteArgs::augment_args,
        factory: |matches, _| {
            let args: ResetToRemoteArgs = parse_args(matches)?;
            Ok(Box::new(ResetToRemote::new(args.remote_branch_names, args.branch)))
        },
    }
}
