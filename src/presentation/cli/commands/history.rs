use clap::Args;

use super::parse_args;
use crate::application::use_cases::{ForkPointReport, HeadReport};
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct ForkPointArgs {
    /// Branch to compare HEAD against
    pub branch: String,
}

pub fn head_registration() -> CommandRegistration {
    CommandRegistration {
        name: "head",
        about: "Show HEAD commit, its age and tags of each working copy",
        configure: |command| command,
        factory: |_, _| Ok(Box::new(HeadReport::new())),
    }
}

pub fn fork_point_registration() -> CommandRegistration {
    CommandRegistration {
        name: "fork-point",
        about: "Show where HEAD of each working copy forked off a branch",
        configure: ForkPointArgs::augment_args,
        factory: |matches, _| {
            let args: ForkPointArgs = parse_args(matches)?;
            Ok(Box::new(ForkPointReport::new(args.branch)))
        },
    }
}
