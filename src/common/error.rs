use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcError {
    #[error("{path} is not a git working copy")]
    NotARepository { path: PathBuf },

    #[error("Failed to start '{command}' in {working_directory}: {source}")]
    SpawnFailed {
        command: String,
        working_directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed in {working_directory} with exit code {exit_code}")]
    CommandFailed {
        command: String,
        working_directory: PathBuf,
        exit_code: i32,
        stderr: String,
    },

    #[error("Unexpected output from '{command}': {output:?}")]
    ParseError { command: String, output: String },

    #[error("{working_copy} does not have a branch named {branch}")]
    NoSuchBranch {
        working_copy: PathBuf,
        branch: String,
    },

    #[error("{fragments:?} matches more than one remote branch: {candidates:?}")]
    AmbiguousMatch {
        fragments: Vec<String>,
        candidates: Vec<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WcError {
    pub fn not_a_repository(path: impl Into<PathBuf>) -> Self {
        Self::NotARepository { path: path.into() }
    }

    pub fn spawn_failed(
        command: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::SpawnFailed {
            command: command.into(),
            working_directory: working_directory.into(),
            source,
        }
    }

    pub fn command_failed(
        command: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            working_directory: working_directory.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn parse_error(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ParseError {
            command: command.into(),
            output: output.into(),
        }
    }

    pub fn no_such_branch(working_copy: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self::NoSuchBranch {
            working_copy: working_copy.into(),
            branch: branch.into(),
        }
    }

    pub fn ambiguous_match(fragments: Vec<String>, candidates: Vec<String>) -> Self {
        Self::AmbiguousMatch {
            fragments,
            candidates,
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }

    /// Errors a multi-node command reports and then skips the node for,
    /// instead of treating them as a failure of the node.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::NoSuchBranch { .. } | Self::AmbiguousMatch { .. })
    }
}

impl From<std::io::Error> for WcError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for WcError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for WcError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<regex::Error> for WcError {
    fn from(error: regex::Error) -> Self {
        Self::config_error_with_source("Invalid filter pattern", error)
    }
}
