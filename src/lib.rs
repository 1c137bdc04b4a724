//! # wctree - nested working copy tree tool
//!
//! `wctree` treats a git working copy together with every git working copy
//! nested inside it as one tree, and runs git or git-svn operations across
//! the whole tree in a single pass.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the tree, dirty working copies are marked with `*`
//! wctree tree
//!
//! # Run a shell command in every working copy
//! wctree each git log -1 --oneline
//!
//! # Fetch everything, then show a branch overview
//! wctree fetch
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: the working-copy tree and its value objects
//! - [`application`]: the traversal engine and one use case per subcommand
//! - [`infrastructure`]: process execution, git plumbing, discovery cache, configuration
//! - [`presentation`]: the clap CLI and the command registry
//! - [`common`]: error type and result helpers
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wctree::application::services::{RunContext, Traversal};
//! use wctree::application::use_cases::TreeListing;
//! use wctree::domain::entities::{WorkingCopy, WorkingCopySettings};
//! use wctree::infrastructure::{ConsoleSink, ToolConfig};
//!
//! # async fn example() -> wctree::Result<()> {
//! let root = WorkingCopy::open(".", WorkingCopySettings::default()).await?;
//! let traversal = Traversal::new(RunContext::new(Arc::new(ConsoleSink), ToolConfig::default()));
//! let report = traversal.run(&root, Box::new(TreeListing::new())).await?;
//! println!("visited {} working copies", report.visited);
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::WcError;
pub use crate::common::result::WcResult as Result;
