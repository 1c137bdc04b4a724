use clap::Args;

use super::parse_args;
use crate::application::use_cases::PullWithAutostash;
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct PullArgs {
    /// Skip the branch summary after pulling
    #[arg(long)]
    pub no_summary: bool,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "pull",
        about: "Fast-forward pull in each working copy with an upstream, stashing local changes",
        configure: PullArgs::augment_args,
        factory: |matches, _| {
            let args: PullArgs = parse_args(matches)?;
            Ok(Box::new(PullWithAutostash::new(!args.no_summary)))
        },
    }
}
