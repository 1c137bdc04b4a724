use clap::Args;

use super::parse_args;
use crate::application::use_cases::CheckoutBranch;
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Branch to switch to wherever it exists
    pub branch: String,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "checkout",
        about: "Switch each working copy that has the branch. Aborts if any working copy is dirty",
        configure: CheckoutArgs::augment_args,
        factory: |matches, _| {
            let args: CheckoutArgs = parse_args(matches)?;
            Ok(Box::new(CheckoutBranch::new(args.branch)))
        },
    }
}
