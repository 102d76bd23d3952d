// src/fix/extract/explanation.rs
// Issue / Cause / Fix summary from the prose around the code block

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Single-line `<...>` spans such as `<think>` markers
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("tag pattern is valid"));

static PYTHON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```python.*?```").expect("python block pattern is valid"));

const ISSUE_WORDS: [&str; 3] = ["problem", "bug", "error"];
const CAUSE_WORDS: [&str; 2] = ["because", "due to"];
const FIX_WORDS: [&str; 3] = ["fix", "solution", "change"];

const ISSUE_PLACEHOLDER: &str = "Not clearly stated.";
const CAUSE_PLACEHOLDER: &str = "Not explicitly explained.";
const FIX_PLACEHOLDER: &str = "Fix applied as per AI.";
const NOT_FOUND: &str = "Not found.";

/// Three-part explanation; renders as `Issue: ..\nCause: ..\nFix: ..`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub issue: String,
    pub cause: String,
    pub fix: String,
}

impl Explanation {
    fn not_found() -> Self {
        Self {
            issue: NOT_FOUND.into(),
            cause: NOT_FOUND.into(),
            fix: NOT_FOUND.into(),
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Issue: {}\nCause: {}\nFix: {}", self.issue, self.cause, self.fix)
    }
}

/// Summarize the first prose segment that has any text in it
pub fn summarize(transcript: &str) -> Explanation {
    let untagged = TAG.replace_all(transcript, "");

    PYTHON_BLOCK
        .split(&untagged)
        .map(|segment| {
            segment
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|lines| !lines.is_empty())
        .map(|lines| classify(&lines))
        .unwrap_or_else(Explanation::not_found)
}

/// Each line fills at most one slot, tried issue, then cause, then fix. A
/// line that matches no slot becomes the issue if none has been found yet.
fn classify(lines: &[&str]) -> Explanation {
    let mut issue: Option<&str> = None;
    let mut cause: Option<&str> = None;
    let mut fix: Option<&str> = None;

    for &line in lines {
        let lower = line.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if issue.is_none() && mentions(&ISSUE_WORDS) {
            issue = Some(line);
        } else if cause.is_none() && mentions(&CAUSE_WORDS) {
            cause = Some(line);
        } else if fix.is_none() && mentions(&FIX_WORDS) {
            fix = Some(line);
        } else if issue.is_none() {
            issue = Some(line);
        }
    }

    Explanation {
        issue: issue.unwrap_or(ISSUE_PLACEHOLDER).to_string(),
        cause: cause.unwrap_or(CAUSE_PLACEHOLDER).to_string(),
        fix: fix.unwrap_or(FIX_PLACEHOLDER).to_string(),
    }
}
