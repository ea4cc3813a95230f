use issue_manager::config::{self, GlobalConfig, MergedConfig, ProjectConfig};
use std::path::Path;
use tempfile::TempDir;

// === GlobalConfig Tests ===

#[test]
fn test_global_config_default() {
    let config = GlobalConfig::default();
    assert_eq!(config.editor, None);
    assert_eq!(config.runner_command, "claude");
    assert_eq!(config.commit_model, "haiku");
    assert_eq!(config.scroll_step, 8);
    assert_eq!(config.tick_ms, 100);
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_global_config_partial_toml() {
    let config: GlobalConfig = toml::from_str("editor = \"nvim\"\nscroll_step = 4\n").unwrap();
    assert_eq!(config.editor.as_deref(), Some("nvim"));
    assert_eq!(config.scroll_step, 4);
    // unspecified fields keep their defaults
    assert_eq!(config.runner_command, "claude");
}

#[test]
fn test_global_config_load_from_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&temp_dir.path().join("nope.toml")).unwrap();
    assert_eq!(config.commit_model, "haiku");
}

#[test]
fn test_global_config_load_from_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "scroll_step = \"wide\"").unwrap();
    assert!(GlobalConfig::load_from(&path).is_err());
}

// === ProjectConfig Tests ===

#[test]
fn test_project_config_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let config = ProjectConfig {
        editor: Some("hx".to_string()),
        analysis_model: Some("opus".to_string()),
        ..ProjectConfig::default()
    };
    config.save(temp_dir.path()).unwrap();

    assert!(temp_dir.path().join(".im").join("config.toml").exists());
    let loaded = ProjectConfig::load(temp_dir.path()).unwrap();
    assert_eq!(loaded.editor.as_deref(), Some("hx"));
    assert_eq!(loaded.analysis_model.as_deref(), Some("opus"));
    assert_eq!(loaded.runner_command, None);
}

#[test]
fn test_project_config_missing_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = ProjectConfig::load(temp_dir.path()).unwrap();
    assert_eq!(loaded.editor, None);
}

#[test]
fn test_log_dir_is_inside_project() {
    assert_eq!(config::log_dir(Path::new("/p")), Path::new("/p/.im"));
}

// === MergedConfig Tests ===

#[test]
fn test_merged_project_overrides_global() {
    let global = GlobalConfig {
        editor: Some("vim".to_string()),
        commit_model: "haiku".to_string(),
        ..GlobalConfig::default()
    };
    let project = ProjectConfig {
        editor: Some("emacs".to_string()),
        tick_ms: Some(250),
        ..ProjectConfig::default()
    };

    let merged = MergedConfig::merge(&global, &project);
    assert_eq!(merged.editor.as_deref(), Some("emacs"));
    assert_eq!(merged.commit_model, "haiku");
    assert_eq!(merged.tick_ms, 250);
}

#[test]
fn test_merged_falls_back_to_global() {
    let global = GlobalConfig {
        analysis_model: Some("sonnet".to_string()),
        ..GlobalConfig::default()
    };
    let merged = MergedConfig::merge(&global, &ProjectConfig::default());
    assert_eq!(merged.analysis_model.as_deref(), Some("sonnet"));
    assert_eq!(merged.runner_command, "claude");
}

#[test]
fn test_merged_clamps_degenerate_values() {
    let project = ProjectConfig {
        scroll_step: Some(0),
        tick_ms: Some(0),
        ..ProjectConfig::default()
    };
    let merged = MergedConfig::merge(&GlobalConfig::default(), &project);
    assert_eq!(merged.scroll_step, 1);
    assert_eq!(merged.tick_ms, 10);
}
