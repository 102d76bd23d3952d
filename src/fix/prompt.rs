// src/fix/prompt.rs

/// Build the single user message sent to the model for `code`
pub fn build_fix_prompt(code: &str) -> String {
    format!(
        r#"
### Python Buggy Code:
{code}

### Task:
1. Fix the code. Output ONLY the corrected code first inside a Python code block:
```python
# your fixed code here
```
2. After the code block, return a three-line explanation **in plain text**:

Issue: ...
Cause: ...
Fix: ...

Do NOT mix explanations inside the code block. Do not skip code.
"#
    )
}
