use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::error::WcError;
use crate::common::result::WcResult;

/// One of the two output streams of a child process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    /// Primary (result) output
    Stdout,
    /// Diagnostic output
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => write!(f, "stdout"),
            OutputStream::Stderr => write!(f, "stderr"),
        }
    }
}

/// What happens to a line matched by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Include,
    Exclude,
}

impl FromStr for FilterAction {
    type Err = WcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "+" | "include" => Ok(FilterAction::Include),
            "-" | "exclude" => Ok(FilterAction::Exclude),
            _ => Err(WcError::config_error(format!(
                "Unknown filter action '{}', expected include/exclude or +/-",
                s
            ))),
        }
    }
}

/// A single include/exclude rule; the pattern is searched anywhere in the line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FilterRuleSpec", into = "FilterRuleSpec")]
pub struct FilterRule {
    action: FilterAction,
    pattern: Regex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FilterRuleSpec {
    action: FilterAction,
    pattern: String,
}

impl TryFrom<FilterRuleSpec> for FilterRule {
    type Error = WcError;

    fn try_from(spec: FilterRuleSpec) -> Result<Self, Self::Error> {
        FilterRule::new(spec.action, &spec.pattern)
    }
}

impl From<FilterRule> for FilterRuleSpec {
    fn from(rule: FilterRule) -> Self {
        Self {
            action: rule.action,
            pattern: rule.pattern.as_str().to_string(),
        }
    }
}

impl FilterRule {
    pub fn new(action: FilterAction, pattern: &str) -> WcResult<Self> {
        Ok(Self {
            action,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn include(pattern: &str) -> WcResult<Self> {
        Self::new(FilterAction::Include, pattern)
    }

    pub fn exclude(pattern: &str) -> WcResult<Self> {
        Self::new(FilterAction::Exclude, pattern)
    }

    pub fn action(&self) -> FilterAction {
        self.action
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Ordered rules evaluated top to bottom, first match wins, no match keeps the line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<FilterRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Build a rule set from compact `(action, pattern)` pairs such as `("-", "^#")`
    pub fn from_pairs(pairs: &[(&str, &str)]) -> WcResult<Self> {
        let rules = pairs
            .iter()
            .map(|(action, pattern)| FilterRule::new(action.parse()?, pattern))
            .collect::<WcResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn keep(&self, line: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.matches(line))
            .map_or(true, |rule| rule.action == FilterAction::Include)
    }

    pub fn filter<'a, I>(&self, lines: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().filter(|line| self.keep(line)).collect()
    }
}

/// Per-stream rule sets; without a dedicated stderr set the stdout rules apply to both
#[derive(Debug, Clone, Default)]
pub struct OutputFilter {
    stdout: RuleSet,
    stderr: Option<RuleSet>,
}

impl OutputFilter {
    pub fn new(stdout: RuleSet) -> Self {
        Self {
            stdout,
            stderr: None,
        }
    }

    pub fn with_stderr(mut self, stderr: RuleSet) -> Self {
        self.stderr = Some(stderr);
        self
    }

    pub fn rules_for(&self, stream: OutputStream) -> &RuleSet {
        match stream {
            OutputStream::Stdout => &self.stdout,
            OutputStream::Stderr => self.stderr.as_ref().unwrap_or(&self.stdout),
        }
    }

    pub fn keep(&self, stream: OutputStream, line: &str) -> bool {
        self.rules_for(stream).keep(line)
    }
}
