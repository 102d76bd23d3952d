// src/fix/extract/code.rs
// Corrected-code strategies, most to least specific

use once_cell::sync::Lazy;
use regex::Regex;

static PYTHON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```python\s*(.*?)\s*```").expect("python fence pattern is valid")
});

static ANY_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("fence pattern is valid"));

/// A trimmed line that opens a statement
static STATEMENT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(def |class |import |from |if |for |while |try|except|print\(|return)")
        .expect("statement pattern is valid")
});

static KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(def|class|import|from|if|for|while|try|except|return)\b")
        .expect("keyword pattern is valid")
});

/// Substrings that make an untagged block look like Python
const BLOCK_HINTS: [&str; 6] = ["def ", "import ", "class ", "print(", "return ", "if "];

const CODE_PUNCTUATION: [char; 4] = ['=', ':', '(', ')'];

/// First ```python block
pub(super) fn python_fence(text: &str) -> Option<String> {
    PYTHON_FENCE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// First untagged block, only if it looks like code. A block that does not
/// look like code ends this strategy; later blocks are not considered.
pub(super) fn untagged_fence(text: &str) -> Option<String> {
    let caps = ANY_FENCE.captures(text)?;
    let block = caps[1].trim();
    BLOCK_HINTS
        .iter()
        .any(|hint| block.contains(hint))
        .then(|| block.to_string())
}

/// Keep fenced lines and lines that read like statements or assignments,
/// then accept the result only if it still looks like code.
pub(super) fn reconstruct_lines(text: &str) -> Option<String> {
    let mut kept = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || STATEMENT_START.is_match(line) || looks_like_assignment(line) {
            kept.push(line);
        }
    }

    let code = kept.join("\n").trim().to_string();
    let plausible = KEYWORD.is_match(&code) || code.contains(CODE_PUNCTUATION);
    plausible.then_some(code)
}

fn looks_like_assignment(line: &str) -> bool {
    !line.is_empty()
        && !line.starts_with('#')
        && !line.starts_with("//")
        && line.contains('=')
        && !line.ends_with(':')
}
