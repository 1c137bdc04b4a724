//! Subcommand arguments and their registrations
pub mod branch;
pub mod check_email;
pub mod checkout;
pub mod each;
pub mod fetch;
pub mod history;
pub mod pull;
pub mod reset_to_remote;
pub mod status;
pub mod svn;
pub mod tree;

use clap::{ArgMatches, FromArgMatches};

use super::registry::{CommandPlugin, CommandRegistry};
use crate::common::error::WcError;
use crate::common::result::WcResult;

/// The commands shipped with wctree
pub struct BuiltinCommands;

impl CommandPlugin for BuiltinCommands {
    fn register(&self, registry: &mut CommandRegistry) {
        for registration in [
            tree::registration(),
            status::registration(),
            branch::registration(),
            each::registration(),
            fetch::registration(),
            pull::registration(),
            checkout::registration(),
            reset_to_remote::registration(),
            svn::rebase_registration(),
            svn::diff_registration(),
            svn::lineage_registration(),
            history::head_registration(),
            history::fork_point_registration(),
            check_email::registration(),
        ] {
            registry.register(registration);
        }
    }
}

pub(crate) fn parse_args<T: FromArgMatches>(matches: &ArgMatches) -> WcResult<T> {
    T::from_arg_matches(matches)
        .map_err(|e| WcError::config_error_with_source("Invalid command arguments", e))
}
