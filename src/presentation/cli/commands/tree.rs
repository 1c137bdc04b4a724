use crate::application::use_cases::TreeListing;
use crate::presentation::cli::registry::CommandRegistration;

pub fn registration() -> CommandRegistration {
    CommandRegistration {
        name: "tree",
        about: "List the tree of nested working copies",
        configure: |command| command,
        factory: |_, _| Ok(Box::new(TreeListing::new())),
    }
}
