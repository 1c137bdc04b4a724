//! Git working-copy trees built in temporary directories

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use wctree::domain::entities::{WorkingCopy, WorkingCopySettings};

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking with its stderr on failure. Returns stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A root working copy with nested working copies below it.
///
/// Every repository starts on `master` with one commit containing
/// `README.md`. Nested repositories are excluded in their parents so that
/// parents stay clean.
pub struct GitTreeFixture {
    _temp_dir: TempDir,
    base: PathBuf,
    root: PathBuf,
}

impl GitTreeFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = std::fs::canonicalize(temp_dir.path()).expect("Failed to canonicalize temp dir");
        let root = base.join("root");
        std::fs::create_dir_all(&root).unwrap();
        init_repository(&root);
        Self {
            _temp_dir: temp_dir,
            base,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Create a nested working copy at `relative` (below the root)
    pub fn add_repo(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(&path).unwrap();
        init_repository(&path);
        self.exclude_in_parents(&path);
        path
    }

    /// A repository next to the root, usable as a remote
    pub fn add_upstream(&self, name: &str) -> PathBuf {
        let path = self.base.join(name);
        std::fs::create_dir_all(&path).unwrap();
        init_repository(&path);
        path
    }

    /// Clone `upstream` to `relative`; `master` tracks `origin/master`
    pub fn add_clone(&self, relative: &str, upstream: &Path) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let target = path.to_string_lossy().into_owned();
        let source = upstream.to_string_lossy().into_owned();
        git(&self.base, &["clone", "-q", &source, &target]);
        configure_identity(&path);
        self.exclude_in_parents(&path);
        path
    }

    /// Commit `file` with `content` in the repository at `dir`
    pub fn commit_file(&self, dir: &Path, file: &str, content: &str) {
        std::fs::write(dir.join(file), content).unwrap();
        git(dir, &["add", file]);
        git(dir, &["commit", "-q", "-m", &format!("update {}", file)]);
    }

    fn exclude_in_parents(&self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.starts_with(&self.root) {
                break;
            }
            let git_dir = ancestor.join(".git");
            if git_dir.is_dir() {
                let excluded = path.strip_prefix(ancestor).unwrap();
                let info = git_dir.join("info");
                std::fs::create_dir_all(&info).unwrap();
                let exclude = info.join("exclude");
                let mut content = std::fs::read_to_string(&exclude).unwrap_or_default();
                content.push_str(&format!("/{}/\n", excluded.display()));
                std::fs::write(&exclude, content).unwrap();
            }
        }
    }

    /// A directory that is not a working copy
    pub fn add_plain_dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Modify the tracked README of the working copy at `repo`
    pub fn make_dirty(&self, repo: &str) {
        let readme = self.path(repo).join("README.md");
        std::fs::write(readme, "# changed\n").unwrap();
    }

    pub fn git(&self, repo: &str, args: &[&str]) -> String {
        git(&self.path(repo), args)
    }

    pub fn create_branch(&self, repo: &str, branch: &str) {
        self.git(repo, &["branch", branch]);
    }

    pub fn current_branch(&self, repo: &str) -> String {
        self.git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).trim().to_string()
    }

    pub fn settings(&self) -> WorkingCopySettings {
        WorkingCopySettings::default().with_cache_enabled(false)
    }

    pub async fn open(&self) -> Arc<WorkingCopy> {
        WorkingCopy::open(&self.root, self.settings())
            .await
            .expect("Failed to open fixture root")
    }

    pub async fn open_with(&self, settings: WorkingCopySettings) -> Arc<WorkingCopy> {
        WorkingCopy::open(&self.root, settings)
            .await
            .expect("Failed to open fixture root")
    }
}

fn init_repository(path: &Path) {
    git(path, &["init", "-q"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    configure_identity(path);
    std::fs::write(path.join("README.md"), "# fixture\n").unwrap();
    git(path, &["add", "README.md"]);
    git(path, &["commit", "-q", "-m", "initial"]);
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.name", "Fixture"]);
    git(path, &["config", "user.email", "fixture@example.com"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}
