use clap::Args;

use super::parse_args;
use crate::application::use_cases::EachCommand;
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct EachArgs {
    /// Shell command to run in each working copy. Add " -- " before the first word starting with -
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, value_name = "SHELL_COMMAND")]
    pub shell_command: Vec<String>,
}

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "each",
        about: "Run a shell command in each working copy",
        configure: EachArgs::augment_args,
        factory: |matches, _| {
            let args: EachArgs = parse_args(matches)?;
            Ok(Box::new(EachCommand::from_words(&args.shell_command)))
        },
    }
}
