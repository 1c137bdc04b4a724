use clap::Args;

use super::parse_args;
use crate::application::use_cases::FetchRemotes;
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Skip the branch summary after fetching
    #[arg(long)]
    pub no_summary: bool,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "fetch",
        about: "Fetch (with prune) in each working copy, then show a branch summary",
        configure: FetchArgs::augment_args,
        factory: |matches, config| {
            let args: FetchArgs = parse_args(matches)?;
            Ok(Box::new(FetchRemotes::new(config.fetch_rules()?, !args.no_summary)))
        },
    }
}
