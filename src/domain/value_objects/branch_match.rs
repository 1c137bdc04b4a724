use std::collections::HashSet;

use crate::common::error::WcError;
use crate::common::result::WcResult;

/// Matches remote branch names against a list of name fragments.
///
/// A remote branch matches when its lower-cased name is one of the fragments
/// on its own, or all fragments in any order joined with `-`. So `["foo", "bar"]`
/// finds `Bar-Foo` as well as `foo-bar` or plain `FOO`.
///
/// Orderings are checked against each name instead of being enumerated up
/// front, so the number of fragments is not limited by memory.
#[derive(Debug, Clone)]
pub struct RemoteBranchMatcher {
    fragments: Vec<String>,
}

impl RemoteBranchMatcher {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn matches(&self, remote_branch: &str) -> bool {
        if self.fragments.is_empty() {
            return false;
        }
        let name = remote_branch.to_lowercase();
        if self.fragments.iter().any(|fragment| *fragment == name) {
            return true;
        }
        let mut used = vec![false; self.fragments.len()];
        is_arrangement(&name, &self.fragments, &mut used, self.fragments.len())
    }

    /// Find the single remote branch (names without the `remotes/` prefix)
    /// matching the fragments. The stored spelling is returned.
    pub fn resolve<'a, I>(&self, remote_branches: I) -> WcResult<Option<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut found: Vec<String> = Vec::new();
        for name in remote_branches {
            if self.matches(name) && !found.iter().any(|f| f == name) {
                found.push(name.to_string());
            }
        }

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(WcError::ambiguous_match(self.fragments.clone(), found)),
        }
    }
}

/// Whether `name` is the unused fragments, each exactly once, joined by `-`
fn is_arrangement(name: &str, fragments: &[String], used: &mut [bool], remaining: usize) -> bool {
    if remaining == 0 {
        return name.is_empty();
    }

    // equal fragments are interchangeable, try each spelling once per position
    let mut tried: HashSet<&str> = HashSet::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if used[i] || !tried.insert(fragment.as_str()) {
            continue;
        }
        let Some(rest) = name.strip_prefix(fragment.as_str()) else {
            continue;
        };
        let rest = if remaining == 1 {
            Some(rest)
        } else {
            rest.strip_prefix('-')
        };
        if let Some(rest) = rest {
            used[i] = true;
            if is_arrangement(rest, fragments, used, remaining - 1) {
                return true;
            }
            used[i] = false;
        }
    }
    false
}
