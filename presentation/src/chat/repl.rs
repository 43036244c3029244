//! REPL (Read-Eval-Print Loop) for interactive tutoring

use crate::ConsoleFormatter;
use crate::ProgressReporter;
use parley_application::{
    ChatSessionUseCase, LlmGateway, NoProgress, ProgressNotifier, SendOutcome,
};
use parley_domain::{CharacterDraft, CompletedReply, LanguageTable, parse_annotations};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A line starting with `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    Characters(String),
    Select(String),
    Create,
    Language {
        target: String,
        native: Option<String>,
    },
    Languages,
    History,
    Speech,
    /// Known command with missing arguments
    Usage(&'static str),
    Unknown(String),
}

/// Parse a slash command. Language names are title-cased so `/language
/// japanese` finds "Japanese".
pub fn parse_command(line: &str) -> ReplCommand {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match name {
        "/help" | "/h" | "/?" => ReplCommand::Help,
        "/quit" | "/exit" | "/q" => ReplCommand::Quit,
        "/characters" | "/c" => ReplCommand::Characters(args.join(" ")),
        "/select" | "/s" => match args.first() {
            Some(id) => ReplCommand::Select(id.to_string()),
            None => ReplCommand::Usage("/select <ID>"),
        },
        "/create" => ReplCommand::Create,
        "/language" | "/l" => match args.as_slice() {
            [target] => ReplCommand::Language {
                target: title_case(target),
                native: None,
            },
            [target, native] => ReplCommand::Language {
                target: title_case(target),
                native: Some(title_case(native)),
            },
            _ => ReplCommand::Usage("/language <TARGET> [NATIVE]"),
        },
        "/languages" => ReplCommand::Languages,
        "/history" => ReplCommand::History,
        "/speech" => ReplCommand::Speech,
        _ => ReplCommand::Unknown(name.to_string()),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("parley").join("history.txt"))
}

/// Interactive chat REPL
pub struct ChatRepl<G: LlmGateway + 'static> {
    session: Arc<ChatSessionUseCase<G>>,
    languages: Arc<LanguageTable>,
    show_progress: bool,
    history_path: Option<PathBuf>,
}

impl<G: LlmGateway + 'static> ChatRepl<G> {
    pub fn new(session: Arc<ChatSessionUseCase<G>>, languages: Arc<LanguageTable>) -> Self {
        Self {
            session,
            languages,
            show_progress: true,
            history_path: default_history_path(),
        }
    }

    /// Set whether to show the typing indicator
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Use `path` for line history instead of the data directory default
    pub fn with_history_file(mut self, path: Option<&str>) -> Self {
        if let Some(path) = path {
            self.history_path = Some(expand_home(path));
        }
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(&mut rl, parse_command(line)) {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Au revoir!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            save_history(&mut rl, path);
        }

        Ok(())
    }

    fn tutor_name(&self) -> String {
        self.session
            .current_character()
            .map(|c| c.name)
            .unwrap_or_else(|| "Tutor".to_string())
    }

    fn print_welcome(&self) {
        let conversation = self.session.conversation();

        println!();
        print!("{}", ConsoleFormatter::header("Parley - Chat Mode"));
        println!();
        println!(
            "Practicing {} (explanations in {}) with {}",
            conversation.target_language(),
            conversation.native_language(),
            self.tutor_name()
        );
        println!();
        self.print_help();
        print!(
            "{}",
            ConsoleFormatter::format_transcript(&conversation, &self.tutor_name())
        );
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  /help, /h, /?              - Show this help");
        println!("  /characters [QUERY]        - List personas");
        println!("  /select <ID>               - Start over with a persona");
        println!("  /create                    - Author a new persona");
        println!("  /language <TARGET> [NATIVE] - Switch languages and start over");
        println!("  /languages                 - Show supported languages");
        println!("  /history                   - Show the conversation so far");
        println!("  /speech                    - Show voice settings");
        println!("  /quit, /exit, /q           - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, rl: &mut DefaultEditor, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Au revoir!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                self.print_help();
            }
            ReplCommand::Characters(query) => {
                println!();
                print!(
                    "{}",
                    ConsoleFormatter::format_characters(&self.session.characters(&query))
                );
                println!();
            }
            ReplCommand::Select(id) => match self.session.select_character(&id) {
                Ok(character) => {
                    println!();
                    println!("Now practicing {} with {}", character.language, character.name);
                    println!();
                    self.print_last_reply();
                }
                Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
            },
            ReplCommand::Create => self.create_character(rl),
            ReplCommand::Language { target, native } => {
                let native = native.unwrap_or_else(|| {
                    self.session.conversation().native_language().to_string()
                });
                if !self.languages.is_supported(&target) {
                    println!(
                        "Note: {} has no built-in profile, generic tutoring applies",
                        target
                    );
                }
                self.session.set_languages(&target, &native);
                println!();
                println!("Now practicing {} (explanations in {})", target, native);
                println!();
                self.print_last_reply();
            }
            ReplCommand::Languages => {
                println!();
                print!("{}", ConsoleFormatter::format_languages(&self.languages));
                println!();
            }
            ReplCommand::History => {
                println!();
                print!(
                    "{}",
                    ConsoleFormatter::format_transcript(
                        &self.session.conversation(),
                        &self.tutor_name()
                    )
                );
            }
            ReplCommand::Speech => {
                let speech = self.session.speech_settings();
                println!("Voice: {} at {:.1}x", speech.locale, speech.rate);
            }
            ReplCommand::Usage(usage) => println!("Usage: {}", usage),
            ReplCommand::Unknown(name) => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn create_character(&self, rl: &mut DefaultEditor) {
        let mut ask = |label: &str| -> Option<String> {
            rl.readline(&format!("  {}: ", label))
                .ok()
                .map(|answer| answer.trim().to_string())
        };

        let Some(name) = ask("Name") else { return };
        let Some(description) = ask("Description") else { return };
        let Some(language) = ask("Language") else { return };
        let Some(personality) = ask("Personality") else { return };

        let draft = CharacterDraft::new(name, description, title_case(&language), personality);
        match self.session.create_character(draft) {
            Ok(character) => {
                println!(
                    "Created {} (id {}). Use /select {} to start.",
                    character.name, character.id, character.id
                );
            }
            Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
        }
    }

    /// Greeting after a reset.
    fn print_last_reply(&self) {
        let conversation = self.session.conversation();
        if let Some(last) = conversation.messages().last() {
            print!(
                "{}",
                ConsoleFormatter::format_reply(
                    &self.tutor_name(),
                    &parse_annotations(&last.content)
                )
            );
            println!();
        }
    }

    async fn process_message(&self, text: &str) {
        println!();

        let reporter = ProgressReporter::new();
        let progress: &dyn ProgressNotifier = if self.show_progress {
            &reporter
        } else {
            &NoProgress
        };

        let result = tokio::select! {
            result = self.session.send_with_progress(text, progress) => result,
            _ = tokio::signal::ctrl_c() => {
                self.session.cancel();
                progress.on_reply_end(None);
                println!("(reply cancelled)");
                println!();
                return;
            }
        };

        match result {
            Ok(SendOutcome::Delivered(completed)) => self.print_reply(&completed),
            Ok(SendOutcome::Discarded) => debug!("Reply discarded"),
            Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
        }
        println!();
    }

    fn print_reply(&self, completed: &CompletedReply) {
        if let Some(id) = completed.corrected {
            let conversation = self.session.conversation();
            if let Some(message) = conversation.messages().iter().find(|m| m.id == id) {
                print!(
                    "{}",
                    ConsoleFormatter::format_corrections(message.corrections())
                );
                println!();
            }
        }

        print!(
            "{}",
            ConsoleFormatter::format_reply(&self.tutor_name(), &completed.reply)
        );
    }
}

fn save_history(rl: &mut DefaultEditor, path: &Path) {
    if let Err(e) = rl.save_history(path) {
        debug!("Could not save history to {}: {}", path.display(), e);
    }
}
