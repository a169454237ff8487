use crate::commands::{self, CommandParse, SlashCommand};
use crate::config::Config;
use crate::files;
use crate::gemini::ChatSession;
use crate::intent::{self, Intent};
use crate::render::{prepare_markdown, MarkdownRenderer};
use crossterm::cursor;
use crossterm::execute;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use is_terminal::IsTerminal;
use std::io::stdout;
use std::path::PathBuf;
use uuid::Uuid;

/// The read-eval-print loop. Owns the chat session for the process
/// lifetime; one line is fully handled before the next prompt.
pub struct ChatEngine {
    session: ChatSession,
    renderer: MarkdownRenderer,
    config: Config,
    working_dir: PathBuf,
    session_id: String,
}

/// What one completed turn produced. The loop decides how to print
/// each arm; failures surface as the `Err` side of `process_turn`.
#[derive(Debug)]
pub enum TurnReply {
    CommandOutput(String),
    FileWritten { path: PathBuf, content: String },
    Rendered(String),
}

pub fn is_exit_request(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

impl ChatEngine {
    pub fn new(session: ChatSession, config: Config, working_dir: PathBuf) -> Self {
        Self {
            session,
            renderer: MarkdownRenderer::new(),
            config,
            working_dir,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run the loop until the exit keyword or end of input, consuming
    /// the engine and closing the session.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.print_banner();

        let interactive = std::io::stdin().is_terminal();

        loop {
            let line = match read_line(interactive) {
                Some(line) => line,
                None => break,
            };
            let line = line.trim().to_string();

            if line.is_empty() {
                continue;
            }
            if is_exit_request(&line) {
                break;
            }

            match self.process_turn(&line).await {
                Ok(reply) => self.print_reply(reply),
                Err(e) => println!("{}", format!("❌ Error: {}", e).red()),
            }
        }

        let transcript = self.session.close();
        println!();
        println!("{}", "Goodbye!".blue().bold());
        if !transcript.is_empty() {
            println!("💬 {} turns this session", transcript.len());
        }

        Ok(())
    }

    /// Handle one classified line. Commands never contact the model;
    /// file-creation and chat turns share the model round trip but
    /// diverge on what happens to the reply.
    pub async fn process_turn(
        &mut self,
        line: &str,
    ) -> Result<TurnReply, Box<dyn std::error::Error>> {
        match intent::classify(line) {
            Intent::Command(parse) => self.handle_command(parse).await,
            Intent::FileCreation(file_type) => {
                let raw = self.exchange(line).await?;
                let path = files::write_generated(&self.working_dir, &file_type, &raw)?;
                Ok(TurnReply::FileWritten { path, content: raw })
            }
            Intent::Chat => {
                let raw = self.exchange(line).await?;
                let text = if self.config.preferences.render_markdown {
                    self.renderer.render(&prepare_markdown(&raw))
                } else {
                    raw
                };
                Ok(TurnReply::Rendered(text))
            }
        }
    }

    async fn handle_command(
        &mut self,
        parse: CommandParse,
    ) -> Result<TurnReply, Box<dyn std::error::Error>> {
        let output = match parse {
            CommandParse::Command(SlashCommand::Write { path, content }) => {
                let written = commands::write_file(&self.working_dir, &path, &content)?;
                format!("📝 Wrote {} bytes to {}", content.len(), written.display())
            }
            CommandParse::Command(SlashCommand::Help) => commands::help_text(),
            CommandParse::Command(SlashCommand::Clear) => {
                let dropped = self.session.clear();
                format!("🧹 Cleared {} turns of context", dropped)
            }
            CommandParse::Command(SlashCommand::Models { filter }) => {
                let models = self.session.client().list_models(&filter).await?;
                if models.is_empty() {
                    "No models matched".to_string()
                } else {
                    let listing: Vec<String> =
                        models.iter().map(|m| format!("  • {}", m)).collect();
                    format!("Available models:\n{}", listing.join("\n"))
                }
            }
            CommandParse::MissingArgument { usage } => format!("⚠️ {}", usage),
            CommandParse::Unknown(name) => {
                format!("⚠️ Unknown command {} (try /help)", name)
            }
        };

        Ok(TurnReply::CommandOutput(output))
    }

    /// One model round trip with the thinking indicator shown for the
    /// duration of the await and cleared on both success and failure.
    async fn exchange(&mut self, line: &str) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = stdout();
        execute!(out, Print("Gemini is thinking...".cyan()))?;

        let result = self.session.send_message(line).await;

        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        result
    }

    fn print_reply(&self, reply: TurnReply) {
        match reply {
            TurnReply::CommandOutput(text) => println!("{}", text),
            TurnReply::FileWritten { path, content } => {
                println!("{}", format!("✅ Created {}", path.display()).green());
                println!();
                println!("{}", content);
            }
            TurnReply::Rendered(text) => {
                println!();
                println!("{}", "Gemini > ".magenta().bold());
                println!("{}", text);
                println!();
            }
        }
    }

    fn print_banner(&self) {
        println!("{}", "Welcome to Gemini CLI Chat!".blue().bold());
        println!("{}", "Type your messages and press Enter. Type \"exit\" to quit.".yellow());
        println!();
        println!("📁 Working directory: {}", self.working_dir.display());
        println!("🆔 Session ID: {}", self.session_id);
        println!("🤖 Model: {}", self.session.client().model());
        println!("💡 /help lists commands; ask to 'create a <type> file ...' to save a reply to disk");
        println!();
    }
}

/// Prompt with inquire on a terminal; fall back to plain line reads so
/// piped input still drives the loop. `None` means end of input.
fn read_line(interactive: bool) -> Option<String> {
    if interactive {
        match inquire::Text::new("💬 You:").prompt() {
            Ok(line) => Some(line),
            Err(_) => None,
        }
    } else {
        let mut buf = String::new();
        match std::io::stdin().read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf),
            Err(_) => None,
        }
    }
}
