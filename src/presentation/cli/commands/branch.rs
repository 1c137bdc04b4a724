use crate::application::use_cases::BranchReport;
use crate::presentation::cli::registry::CommandRegistration;

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "branch",
        about: "Show local branch and upstream or svn branch of each working copy",
        configure: |command| command,
        factory: |_, _| Ok(Box::new(BranchReport::new())),
    }
}
