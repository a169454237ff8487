use gemini_cli::config::*;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.gemini.model, "gemini-pro");
    assert_eq!(
        config.gemini.base_url,
        "https://generativelanguage.googleapis.com/v1beta"
    );
    assert_eq!(config.gemini.api_key, None);

    assert_eq!(config.preferences.verbose, false);
    assert_eq!(config.preferences.render_markdown, true);
    assert_eq!(config.preferences.default_directory, None);
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_string = toml::to_string(&config).unwrap();

    assert!(toml_string.contains("[gemini]"));
    assert!(toml_string.contains("[preferences]"));
    assert!(toml_string.contains("model = \"gemini-pro\""));
}

#[test]
fn test_config_deserialization() {
    let toml_content = r#"
[gemini]
api_key = "test-key"
model = "gemini-1.5-pro"
base_url = "https://api.example.com"

[preferences]
verbose = true
render_markdown = false
default_directory = "/home/user/projects"
"#;

    let config: Config = toml::from_str(toml_content).unwrap();

    assert_eq!(config.gemini.api_key, Some("test-key".to_string()));
    assert_eq!(config.gemini.model, "gemini-1.5-pro");
    assert_eq!(config.gemini.base_url, "https://api.example.com");

    assert_eq!(config.preferences.verbose, true);
    assert_eq!(config.preferences.render_markdown, false);
    assert_eq!(
        config.preferences.default_directory,
        Some("/home/user/projects".to_string())
    );
}

#[test]
fn test_config_manager_save_and_load() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;

    // Point the platform config dir at our temp directory
    let original_xdg = env::var("XDG_CONFIG_HOME").ok();
    env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    let mut config = Config::default();
    config.gemini.model = "gemini-1.5-flash".to_string();
    ConfigManager::save_config(&config)?;

    let loaded = ConfigManager::load_config()?;
    assert_eq!(loaded.gemini.model, "gemini-1.5-flash");

    let config_path = ConfigManager::config_path()?;
    assert!(config_path.starts_with(temp_dir.path()));
    assert!(fs::read_to_string(config_path)?.contains("gemini-1.5-flash"));

    match original_xdg {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    Ok(())
}
