pub mod traversal;
pub mod tree_command;

pub use traversal::{NodeFailure, ScopedWorkingDirectory, Traversal, TraversalReport};
pub use tree_command::{check_git_svn, require_clean_tree, Flow, RunContext, TreeCommand};
