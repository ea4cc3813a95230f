use issue_manager::agent::{self, prompts, TaskRequest};
use std::path::Path;

// === Response parsing ===

#[test]
fn test_parse_json_envelope() {
    let out = agent::parse_response(r##"{"type":"result","result":"# Analysis","session_id":"s-42"}"##);
    assert_eq!(out.text, "# Analysis");
    assert_eq!(out.session.as_deref(), Some("s-42"));
}

#[test]
fn test_parse_envelope_without_session() {
    let out = agent::parse_response(r#"{"result":"text","session_id":""}"#);
    assert_eq!(out.text, "text");
    assert_eq!(out.session, None);
}

#[test]
fn test_parse_plain_text_fallback() {
    let out = agent::parse_response("  not json at all\n");
    assert_eq!(out.text, "not json at all");
    assert_eq!(out.session, None);
}

// === Arguments ===

#[test]
fn test_build_args_minimal() {
    let request = TaskRequest {
        prompt: "do it".to_string(),
        model: None,
        session: None,
    };
    assert_eq!(
        agent::build_args(&request),
        vec!["--output-format", "json", "-p", "do it"]
    );
}

#[test]
fn test_build_args_with_model_and_resume() {
    let request = TaskRequest {
        prompt: "commit msg".to_string(),
        model: Some("haiku".to_string()),
        session: Some("tok".to_string()),
    };
    assert_eq!(
        agent::build_args(&request),
        vec!["--output-format", "json", "--model", "haiku", "--resume", "tok", "-p", "commit msg"]
    );
}

#[test]
fn test_implement_command_resumes_session() {
    let prompt = prompts::implement(Path::new("/repo/issues/0003/plan.md"));
    let cmd = agent::implement_command("claude", "tok", &prompt, Path::new("/repo"));
    assert_eq!(cmd.program, "claude");
    assert_eq!(cmd.args, vec!["--resume".to_string(), "tok".to_string(), prompt]);
    assert_eq!(cmd.working_dir, Path::new("/repo"));
}

#[test]
fn test_missing_runner_not_available() {
    assert!(!agent::is_available("definitely-not-an-installed-binary-xyz"));
}

// === Prompts ===

#[test]
fn test_plan_prompt_embeds_both_documents() {
    let prompt = prompts::plan("the brief", "the analysis");
    assert!(prompt.contains("the brief"));
    assert!(prompt.contains("the analysis"));
}
