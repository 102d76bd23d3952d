// tests/static_analysis.rs
// Real subprocess runs against scripted stand-ins for pylint, mypy and bandit
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::json;
use tempfile::TempDir;

use codefix::analysis::AnalysisOrchestrator;
use codefix::config::{AppConfig, ToolCommand, ToolsConfig};

const PYLINT_OK: &str = r#"#!/bin/sh
cat <<'JSON'
[{"type": "error", "line": 2, "column": 6, "message": "Undefined variable 'y'", "message-id": "E0602"}]
JSON
"#;

const MYPY_OK: &str = r#"#!/bin/sh
for arg; do file="$arg"; done
echo "$file:3: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]"
echo "$file:3: note: See docs"
echo "Found 1 error in 1 file (checked 1 source file)" >&2
exit 1
"#;

const BANDIT_OK: &str = r#"#!/bin/sh
echo "[main] INFO running on Python 3.11" >&2
cat <<'JSON'
{"errors": [], "results": [{"line_number": 7, "issue_text": "hardcoded password", "issue_severity": "HIGH", "issue_confidence": "MEDIUM"}]}
JSON
exit 1
"#;

const SLEEPER: &str = "#!/bin/sh\nexec sleep 30\n";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn script(&self, name: &str, body: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn scratch_dir(&self) -> PathBuf {
        let dir = self.dir.path().join("scratch");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

fn tool(program: String, timeout: Duration) -> ToolCommand {
    ToolCommand { program, timeout }
}

fn tools(pylint: ToolCommand, mypy: ToolCommand, bandit: ToolCommand) -> ToolsConfig {
    ToolsConfig {
        pylint,
        mypy,
        bandit,
        ..AppConfig::default().tools
    }
}

fn happy_tools(fx: &Fixture) -> ToolsConfig {
    let secs = Duration::from_secs(10);
    tools(
        tool(fx.script("pylint", PYLINT_OK), secs),
        tool(fx.script("mypy", MYPY_OK), secs),
        tool(fx.script("bandit", BANDIT_OK), secs),
    )
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_all_tools_normalized() {
    let fx = Fixture::new();
    let orchestrator = AnalysisOrchestrator::new(&happy_tools(&fx));

    let report = orchestrator.analyze("x: int = 1\nx = y\n").await.unwrap();

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "pylint": [{"line": 2, "message": "Undefined variable 'y'", "severity": "error"}],
            "mypy": [{
                "line": 3,
                "message": "Incompatible types in assignment (expression has type \"str\", variable has type \"int\")",
                "severity": "error"
            }],
            "bandit": [{"line": 7, "message": "hardcoded password", "severity": "high"}]
        })
    );
}

#[tokio::test]
async fn test_tool_timeout_isolated_to_its_slot() {
    let fx = Fixture::new();
    let mut config = happy_tools(&fx);
    config.pylint = tool(fx.script("pylint-hang", SLEEPER), Duration::from_millis(300));
    let orchestrator = AnalysisOrchestrator::new(&config);

    let start = Instant::now();
    let report = serde_json::to_value(orchestrator.analyze("x = 1\n").await.unwrap()).unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(
        report["pylint"],
        json!([{"line": 0, "message": "pylint timed out", "severity": "error"}])
    );
    assert_eq!(report["mypy"][0]["line"], 3);
    assert_eq!(report["bandit"][0]["severity"], "high");
}

#[tokio::test]
async fn test_wait_timeout_covers_slow_tool() {
    let fx = Fixture::new();
    let mut config = happy_tools(&fx);
    // Process timeout is generous; the orchestrator's wait gives up first
    config.mypy = tool(fx.script("mypy-hang", SLEEPER), Duration::from_secs(60));
    config.wait_timeout = Duration::from_millis(300);
    let orchestrator = AnalysisOrchestrator::new(&config);

    let report = serde_json::to_value(orchestrator.analyze("x = 1\n").await.unwrap()).unwrap();
    assert_eq!(
        report["mypy"],
        json!([{"line": 0, "message": "mypy timed out", "severity": "error"}])
    );
    assert_eq!(report["pylint"][0]["line"], 2);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timed_out_process_is_killed() {
    let fx = Fixture::new();
    let pid_file = fx.dir.path().join("pid");
    let body = format!("#!/bin/sh\necho $$ > {}\nexec sleep 30\n", pid_file.display());
    let mut config = happy_tools(&fx);
    config.bandit = tool(fx.script("bandit-hang", &body), Duration::from_millis(300));
    let orchestrator = AnalysisOrchestrator::new(&config);

    orchestrator.analyze("x = 1\n").await.unwrap();

    let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    let proc_stat = PathBuf::from(format!("/proc/{}/stat", pid));
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        // Gone, or a zombie waiting to be reaped
        let dead = match std::fs::read_to_string(&proc_stat) {
            Err(_) => true,
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .is_some_and(|rest| rest.trim_start().starts_with('Z')),
        };
        if dead {
            break;
        }
        assert!(Instant::now() < deadline, "process {} still running", pid);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_bandit_unexpected_exit_code() {
    let fx = Fixture::new();
    let mut config = happy_tools(&fx);
    config.bandit = tool(
        fx.script(
            "bandit-usage",
            "#!/bin/sh\necho 'bandit: error: unrecognized arguments' >&2\nexit 2\n",
        ),
        Duration::from_secs(10),
    );
    let orchestrator = AnalysisOrchestrator::new(&config);

    let report = serde_json::to_value(orchestrator.analyze("x = 1\n").await.unwrap()).unwrap();
    assert_eq!(
        report["bandit"],
        json!([{
            "line": 0,
            "message": "bandit error (2): bandit: error: unrecognized arguments",
            "severity": "error"
        }])
    );
}

#[tokio::test]
async fn test_pylint_stderr_short_circuits() {
    let fx = Fixture::new();
    let mut config = happy_tools(&fx);
    let body = format!("{}echo 'No module named astroid' >&2\n", PYLINT_OK);
    config.pylint = tool(fx.script("pylint-broken", &body), Duration::from_secs(10));
    let orchestrator = AnalysisOrchestrator::new(&config);

    let report = serde_json::to_value(orchestrator.analyze("x = 1\n").await.unwrap()).unwrap();
    assert_eq!(
        report["pylint"],
        json!([{"line": 0, "message": "pylint: No module named astroid", "severity": "error"}])
    );
}

#[tokio::test]
async fn test_missing_binary_degrades() {
    let fx = Fixture::new();
    let mut config = happy_tools(&fx);
    config.mypy = tool(
        fx.dir.path().join("not-installed").display().to_string(),
        Duration::from_secs(10),
    );
    let orchestrator = AnalysisOrchestrator::new(&config);

    let report = serde_json::to_value(orchestrator.analyze("x = 1\n").await.unwrap()).unwrap();
    let message = report["mypy"][0]["message"].as_str().unwrap();
    assert!(message.starts_with("mypy failed: "), "{}", message);
    assert_eq!(report["mypy"].as_array().unwrap().len(), 1);
    assert_eq!(report["bandit"][0]["line"], 7);
}

#[tokio::test]
async fn test_repeat_runs_identical_and_leave_no_files() {
    let fx = Fixture::new();
    let scratch = fx.scratch_dir();
    let orchestrator = AnalysisOrchestrator::new(&happy_tools(&fx)).with_scratch_dir(&scratch);

    let code = "import os\npassword = 'hunter2'\n";
    let first = orchestrator.analyze(code).await.unwrap();
    assert!(dir_is_empty(&scratch));
    let second = orchestrator.analyze(code).await.unwrap();
    assert!(dir_is_empty(&scratch));

    assert_eq!(first, second);
}
