use std::fs;
use std::path::{Path, PathBuf};

/// A recognized slash command with its argument payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Write { path: String, content: String },
    Help,
    Clear,
    Models { filter: String },
}

/// Outcome of parsing a `/`-prefixed line. The loop reacts to each arm
/// explicitly instead of guessing from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParse {
    Command(SlashCommand),
    MissingArgument { usage: &'static str },
    Unknown(String),
}

const WRITE_USAGE: &str = "Usage: /write <filename> <content>";

/// Parse a user line as a slash command. Returns `None` for lines that
/// are not commands at all.
pub fn parse(line: &str) -> Option<CommandParse> {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let slashless = trimmed.trim_start_matches('/');
    if slashless.is_empty() {
        return Some(CommandParse::Unknown("/".to_string()));
    }

    let mut parts = slashless.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args = parts.next().map(str::trim_start).unwrap_or_default();

    let parsed = match command.as_str() {
        "write" => match args.split_once(char::is_whitespace) {
            Some((path, content)) if !content.trim().is_empty() => {
                CommandParse::Command(SlashCommand::Write {
                    path: path.to_string(),
                    content: content.trim_start().to_string(),
                })
            }
            _ => CommandParse::MissingArgument { usage: WRITE_USAGE },
        },
        "help" => CommandParse::Command(SlashCommand::Help),
        "clear" => CommandParse::Command(SlashCommand::Clear),
        "models" => CommandParse::Command(SlashCommand::Models { filter: args.to_string() }),
        other => CommandParse::Unknown(format!("/{}", other)),
    };

    Some(parsed)
}

/// Write `/write` content to a file resolved against the working
/// directory, creating parent directories as needed.
pub fn write_file(
    working_dir: &Path,
    path: &str,
    content: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let full_path = working_dir.join(path);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&full_path, content)?;
    Ok(full_path)
}

pub fn help_text() -> String {
    [
        "Available commands:",
        "  /write <filename> <content>  Write content to a file in the working directory",
        "  /models [filter]             List available Gemini models",
        "  /clear                       Clear the conversation context",
        "  /help                        Show this help",
        "  exit                         End the session",
        "",
        "Anything else is sent to Gemini. Ask it to 'create a <type> file ...'",
        "and the reply is saved to disk for you.",
    ]
    .join("\n")
}
