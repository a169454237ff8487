use dirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment key holding the Gemini API credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub preferences: PreferencesConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PreferencesConfig {
    pub default_directory: Option<String>,
    pub verbose: bool,
    pub render_markdown: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig {
                api_key: None,
                model: "gemini-pro".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            },
            preferences: PreferencesConfig {
                default_directory: None,
                verbose: false,
                render_markdown: true,
            },
        }
    }
}

pub struct ConfigManager;

impl ConfigManager {
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_dir = dirs::config_dir()
            .ok_or("Could not find config directory")?
            .join("gemini-cli");

        fs::create_dir_all(&config_dir)?;
        Ok(config_dir.join("config.toml"))
    }

    pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&config_content)?;

        // Override with environment variables
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.gemini.model = model;
        }

        Ok(config)
    }

    pub fn save_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(config)?;
        fs::write(config_path, toml_string)?;
        Ok(())
    }

    pub fn init_config() -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            println!("Configuration file already exists at: {}", config_path.display());
            return Ok(());
        }

        let default_config = Config::default();
        Self::save_config(&default_config)?;

        println!("✅ Configuration initialized at: {}", config_path.display());
        println!("📝 Set your API key in a .env file or the environment:");
        println!("   {}=your-key-here", API_KEY_VAR);

        Ok(())
    }

    pub fn set_config_value(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut config = Self::load_config()?;

        match key {
            "gemini.api_key" => config.gemini.api_key = Some(value.to_string()),
            "gemini.model" => config.gemini.model = value.to_string(),
            "gemini.base_url" => config.gemini.base_url = value.to_string(),
            "preferences.default_directory" => {
                config.preferences.default_directory = Some(value.to_string())
            }
            "preferences.verbose" => config.preferences.verbose = value.parse()?,
            "preferences.render_markdown" => config.preferences.render_markdown = value.parse()?,
            _ => return Err(format!("Unknown config key: {}", key).into()),
        }

        Self::save_config(&config)?;
        println!("✅ Updated {}: {}", key, value);
        Ok(())
    }

    pub fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
        let config = Self::load_config()?;
        let cwd = env::current_dir()?;

        if resolve_api_key(&cwd, &config).is_some() {
            println!("✅ Configuration is valid");
            println!("🔧 Model: {}", config.gemini.model);
            println!("🔧 Base URL: {}", config.gemini.base_url);
            Ok(())
        } else {
            println!("❌ Gemini API key not found");
            println!("💡 Put {}=<your-key> in a .env file here or in your home directory", API_KEY_VAR);
            println!("💡 Or environment: export {}=<your-key>", API_KEY_VAR);
            Err("Missing API key".into())
        }
    }
}

/// Resolve the API credential, checking in order: a `.env` file in the
/// working directory, a `.env` file in the home directory, the process
/// environment, and finally the config file.
pub fn resolve_api_key(working_dir: &Path, config: &Config) -> Option<String> {
    let mut candidates = vec![working_dir.join(".env")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".env"));
    }

    let env_value = env::var(API_KEY_VAR).ok();
    resolve_api_key_from(&candidates, env_value, config)
}

fn resolve_api_key_from(
    env_files: &[PathBuf],
    env_value: Option<String>,
    config: &Config,
) -> Option<String> {
    for path in env_files {
        if let Some(key) = read_env_file_key(path, API_KEY_VAR) {
            return Some(key);
        }
    }

    env_value
        .filter(|v| !v.is_empty())
        .or_else(|| config.gemini.api_key.clone())
}

fn read_env_file_key(path: &Path, key: &str) -> Option<String> {
    let iter = dotenvy::from_path_iter(path).ok()?;
    for item in iter {
        let (name, value) = item.ok()?;
        if name == key && !value.is_empty() {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn env_file_key_wins_over_missing_file() {
        let temp = TempDir::new().unwrap();
        let env_path = temp.path().join(".env");
        fs::write(&env_path, format!("{}=from-file\nOTHER=x\n", API_KEY_VAR)).unwrap();

        assert_eq!(
            read_env_file_key(&env_path, API_KEY_VAR),
            Some("from-file".to_string())
        );
        assert_eq!(read_env_file_key(&temp.path().join("absent"), API_KEY_VAR), None);
    }

    #[test]
    fn resolution_order_is_file_then_env_then_config() {
        let temp = TempDir::new().unwrap();
        let env_path = temp.path().join(".env");
        fs::write(&env_path, format!("{}=from-file\n", API_KEY_VAR)).unwrap();

        let mut config = Config::default();
        config.gemini.api_key = Some("from-config".to_string());

        let files = vec![env_path];
        let resolved =
            resolve_api_key_from(&files, Some("from-env".to_string()), &config);
        assert_eq!(resolved, Some("from-file".to_string()));

        let no_files: Vec<PathBuf> = vec![temp.path().join("absent")];
        let resolved =
            resolve_api_key_from(&no_files, Some("from-env".to_string()), &config);
        assert_eq!(resolved, Some("from-env".to_string()));

        let resolved = resolve_api_key_from(&no_files, None, &config);
        assert_eq!(resolved, Some("from-config".to_string()));
    }
}
