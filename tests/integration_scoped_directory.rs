//! Commands that run in the node's directory must not leak the process
//! working directory. Kept in its own test binary because it changes the
//! process-wide current directory.

mod common;

use std::sync::Arc;
use wctree::application::services::{RunContext, ScopedWorkingDirectory, Traversal};
use wctree::application::use_cases::EachCommand;
use wctree::infrastructure::{MemorySink, ToolConfig};

use common::{git_available, GitTreeFixture, RecordingCommand};

// One test only: the process directory is shared by every test in a binary
#[tokio::test]
async fn test_working_directory_is_restored_after_failures() {
    if !git_available() {
        return;
    }
    let fixture = GitTreeFixture::new();
    fixture.add_repo("a");
    fixture.add_repo("b");
    let root = fixture.open().await;

    let before = std::env::current_dir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let report = Traversal::new(RunContext::new(sink.clone(), ToolConfig::default()))
        .run(&root, Box::new(EachCommand::new("exit 3")))
        .await
        .unwrap();

    assert_eq!(std::env::current_dir().unwrap(), before);
    assert_eq!(report.visited, 3);
    assert_eq!(report.failed.len(), 3);
    assert!(!report.is_success());

    // entering a missing directory fails and leaves the directory alone
    assert!(ScopedWorkingDirectory::enter(&fixture.path("missing")).is_err());
    assert_eq!(std::env::current_dir().unwrap(), before);

    {
        let _guard = ScopedWorkingDirectory::enter(&fixture.path("a")).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), fixture.path("a"));
    }
    assert_eq!(std::env::current_dir().unwrap(), before);

    // an opted-in command sees each node's directory while it runs
    let recording = RecordingCommand::new("rec")
        .in_node_directory()
        .failing_at("a");
    let history = recording.history();
    let report = Traversal::new(RunContext::new(sink.clone(), ToolConfig::default()))
        .run(&root, Box::new(recording))
        .await
        .unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(std::env::current_dir().unwrap(), before);

    let cwds: Vec<String> = history
        .lock()
        .unwrap()
        .iter()
        .filter_map(|entry| entry.strip_prefix("rec:cwd:").map(str::to_string))
        .collect();
    let expected: Vec<String> = ["", "a", "b"]
        .iter()
        .map(|relative| fixture.path(relative).display().to_string())
        .collect();
    assert_eq!(cwds, expected);
}
