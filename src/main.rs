use clap::Parser;
use crossterm::style::Stylize;
use gemini_cli::cli::{Cli, Commands, ConfigCommand};
use gemini_cli::config::{self, ConfigManager, API_KEY_VAR};
use gemini_cli::engine::ChatEngine;
use gemini_cli::gemini::{ChatSession, GeminiClient};
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { config_command }) => match config_command {
            ConfigCommand::Init => {
                ConfigManager::init_config()?;
            }
            ConfigCommand::Get => {
                let config = ConfigManager::load_config()?;
                let toml_string = toml::to_string_pretty(&config)?;
                println!("Current configuration:\n{}", toml_string);
            }
            ConfigCommand::Set { key, value } => {
                ConfigManager::set_config_value(&key, &value)?;
            }
            ConfigCommand::Validate => {
                ConfigManager::validate_config()?;
            }
        },
        None => {
            start_chat(cli).await;
        }
    }

    Ok(())
}

/// Chat startup. Everything that can fail here is fatal: diagnostics
/// go to stderr and the process exits 1 before any prompt is shown.
async fn start_chat(cli: Cli) {
    let mut config = match ConfigManager::load_config() {
        Ok(config) => config,
        Err(e) => fatal(&format!("Error loading configuration: {}", e)),
    };

    // CLI overrides for one run
    if let Some(model) = cli.model {
        config.gemini.model = model;
    }
    if cli.verbose {
        config.preferences.verbose = true;
    }

    let working_dir = cli
        .dir
        .or_else(|| config.preferences.default_directory.clone())
        .unwrap_or_else(|| ".".to_string());

    let working_dir = match fs::canonicalize(&working_dir) {
        Ok(path) => path,
        Err(e) => fatal(&format!("Invalid working directory '{}': {}", working_dir, e)),
    };

    let Some(api_key) = config::resolve_api_key(&working_dir, &config) else {
        eprintln!("{}", format!("❌ {} not found", API_KEY_VAR).red());
        eprintln!(
            "💡 Put {}=<your-key> in a .env file in this directory or your home directory,",
            API_KEY_VAR
        );
        eprintln!("💡 or export {} in your environment.", API_KEY_VAR);
        std::process::exit(1);
    };

    let client = match GeminiClient::new(config.clone(), api_key) {
        Ok(client) => client,
        Err(e) => fatal(&format!("Error initializing chat: {}", e)),
    };

    let session = ChatSession::open(client);
    let engine = ChatEngine::new(session, config, working_dir);

    if let Err(e) = engine.run().await {
        fatal(&format!("Error: {}", e));
    }
}

fn fatal(message: &str) -> ! {
    eprintln!("{}", format!("❌ {}", message).red());
    std::process::exit(1);
}
