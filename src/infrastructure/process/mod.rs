pub mod command_executor;

pub use command_executor::{CommandLine, ProcessOutput, ProcessRun};
