pub mod repository;

pub use repository::{
    AheadBehind, BranchListing, CommitInfo, EchoOptions, GitRepository, StatusEntry,
};
