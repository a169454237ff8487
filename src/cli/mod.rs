use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gemini")]
#[command(about = "Interactive terminal chat for the Gemini API with markdown rendering")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the model from config (e.g. 'gemini-pro')
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Working directory for generated files
    #[arg(long, global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Manage gemini-cli configuration")]
    Config {
        #[command(subcommand)]
        config_command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Initialize configuration with defaults")]
    Init,
    #[command(about = "Display current configuration")]
    Get,
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (e.g. 'gemini.model')")]
        key: String,
        #[arg(help = "Configuration value")]
        value: String,
    },
    #[command(about = "Validate current configuration")]
    Validate,
}
