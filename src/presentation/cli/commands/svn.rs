use clap::Args;

use super::parse_args;
use crate::application::use_cases::{SvnDiff, SvnLineage, SvnRebase};
use crate::presentation::cli::registry::CommandRegistration;

#[derive(Debug, Args)]
pub struct SvnDiffArgs {
    /// Extra arguments for git diff. Add " -- " before the first one starting with -
    #[arg(value_name = "GIT_DIFF_ARGS")]
    pub git_diff_args: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SvnLineageArgs {
    /// Look up the commit an svn revision became instead of describing HEAD
    #[arg(short, long)]
    pub revision: Option<u64>,
}

pub fn rebase_registration() -> CommandRegistration {
    CommandRegistration {
        name: "svn-rebase",
        about: "Run git svn rebase on master in each git-svn working copy. Aborts if any working copy is dirty",
        configure: |command| command,
        factory: |_, _| Ok(Box::new(SvnRebase::new())),
    }
}

pub fn diff_registration() -> CommandRegistration {
    CommandRegistration {
        name: "svn-diff",
        about: "Print a diff of the first git-svn working copy that matches the corresponding svn diff",
        configure: SvnDiffArgs::augment_args,
        factory: |matches, _| {
            let args: SvnDiffArgs = parse_args(matches)?;
            Ok(Box::new(SvnDiff::new(args.git_diff_args)))
        },
    }
}

pub fn lineage_registration() -> CommandRegistration {
    CommandRegistration {
        name: "svn-lineage",
        about: "Show the svn revision and URL behind HEAD of each git-svn working copy",
        configure: SvnLineageArgs::augment_args,
        factory: |matches, _| {
            let args: SvnLineageArgs = parse_args(matches)?;
            Ok(Box::new(SvnLineage::new(args.revision)))
        },
    }
}
