//! Common test utilities and helpers
//!
//! Shared by the integration tests: a builder for trees of real git working
//! copies and a scriptable command that records what the traversal did.

#![allow(dead_code)]

pub mod recording_command;
pub mod test_fixtures;

pub use recording_command::RecordingCommand;
pub use test_fixtures::{git_available, GitTreeFixture};

