use clap::Args;

use super::parse_args;
use crate::application::use_cases::CheckEmail;
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct CheckEmailArgs {
    /// Configure this address where user.email is missing
    #[arg(long, value_name = "EMAIL")]
    pub add_missing_email: Option<String>,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "check-email",
        about: "Report the configured user.email of each working copy",
        configure: CheckEmailArgs::augment_args,
        factory: |matches, _| {
            let args: CheckEmailArgs = parse_args(matches)?;
            Ok(Box::new(CheckEmail::new(args.add_missing_email)))
        },
    }
}
