//! The external analysis agent: a CLI that takes a prompt, optionally resumes
//! an earlier session, and prints a JSON envelope with the result.

mod operations;
pub mod prompts;

pub use operations::{ClaudeRunner, TaskOutput, TaskRequest, TaskRunner};

#[cfg(any(test, feature = "test-mocks"))]
pub use operations::MockTaskRunner;

use serde::Deserialize;
use std::path::Path;

use crate::operations::ForegroundCommand;

/// JSON envelope printed by `--output-format json`
#[derive(Debug, Deserialize)]
struct Response {
    result: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Interpret runner stdout. Anything that isn't the JSON envelope is taken as
/// plain text with no continuation token.
pub fn parse_response(stdout: &str) -> TaskOutput {
    match serde_json::from_str::<Response>(stdout.trim()) {
        Ok(resp) => TaskOutput {
            text: resp.result,
            session: resp.session_id.filter(|s| !s.is_empty()),
        },
        Err(err) => {
            tracing::debug!(error = %err, "runner output is not JSON, using raw text");
            TaskOutput {
                text: stdout.trim().to_string(),
                session: None,
            }
        }
    }
}

/// Arguments for a non-interactive run
pub fn build_args(request: &TaskRequest) -> Vec<String> {
    let mut args = vec!["--output-format".to_string(), "json".to_string()];
    if let Some(model) = &request.model {
        args.push("--model".to_string());
        args.push(model.clone());
    }
    if let Some(session) = &request.session {
        args.push("--resume".to_string());
        args.push(session.clone());
    }
    args.push("-p".to_string());
    args.push(request.prompt.clone());
    args
}

/// Interactive implementation run that resumes the planning session
pub fn implement_command(runner: &str, session: &str, prompt: &str, working_dir: &Path) -> ForegroundCommand {
    ForegroundCommand {
        program: runner.to_string(),
        args: vec!["--resume".to_string(), session.to_string(), prompt.to_string()],
        working_dir: working_dir.to_path_buf(),
    }
}

/// Check if the runner binary is installed
pub fn is_available(command: &str) -> bool {
    which::which(command).is_ok()
}
