use crate::application::use_cases::StatusReport;
use crate::presentation::cli::registry::CommandRegistration;

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "status",
        about: "Run git status in each working copy, quiet for clean ones",
        configure: |command| command,
        factory: |_, config| Ok(Box::new(StatusReport::new(config.status_rules()?))),
    }
}
