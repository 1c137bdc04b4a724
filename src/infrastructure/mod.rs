/// Infrastructure layer modules
///
/// This layer talks to the outside world:
/// - Process execution with filtered, echoed output
/// - git / git-svn invocations and output parsing
/// - Child discovery, the discovery cache and configuration files
/// - Console streams
pub mod console;
pub mod filesystem;
pub mod git;
pub mod process;

// Re-export commonly used types
pub use console::{ConsoleSink, MemorySink, OutputSink};
pub use filesystem::{ConfigStore, DiscoveryCache, ToolConfig};
pub use git::{EchoOptions, GitRepository};
pub use process::{CommandLine, ProcessOutput, ProcessRun};
