//! Chat command handler.
//!
//! Line-oriented conversation over stdin. One session lasts until `/exit`
//! or end of input.

use super::read_context_file;
use clap::Args;
use lexguide_core::{config::AppConfig, AppResult};
use lexguide_engine::{EngineBuilder, QaEngine, Session};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands: /reset clears the conversation, /history shows it, /exit quits.";

/// Start an interactive conversation
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// File with extra context included with every question
    #[arg(long)]
    pub context_file: Option<PathBuf>,
}

/// What a chat input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    Reset,
    History,
    Help,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/exit" | "/quit" => Input::Exit,
        "/reset" => Input::Reset,
        "/history" => Input::History,
        "/help" => Input::Help,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        question => Input::Question(question),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let context = read_context_file(self.context_file.as_deref())?;
        let engine = EngineBuilder::from_config(config).await?;
        let session = engine.new_session();

        println!("Lexguide legal assistant. {}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                Input::Empty => continue,
                Input::Exit => break,
                Input::Help => println!("{}", HELP),
                Input::Reset => {
                    engine.reset(&session).await;
                    println!("Conversation cleared.");
                }
                Input::History => print_history(&engine, &session).await,
                Input::Unknown(cmd) => println!("Unknown command {}. {}", cmd, HELP),
                Input::Question(question) => {
                    let answer = engine.answer(&session, question, context.as_deref()).await;
                    println!("{}\n", answer);
                }
            }
        }

        tracing::info!(session = %session.id(), "Chat session ended");
        Ok(())
    }
}

async fn print_history(engine: &QaEngine, session: &Session) {
    let history = engine.history(session).await;
    if history.is_empty() {
        println!("No exchanges yet.");
        return;
    }

    for (i, exchange) in history.iter().enumerate() {
        println!(
            "[{}] {}\nQ: {}\nA: {}\n",
            i + 1,
            exchange.timestamp.format("%H:%M:%S"),
            exchange.question,
            exchange.answer
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("/exit"), Input::Exit);
        assert_eq!(parse_input(" /reset "), Input::Reset);
        assert_eq!(parse_input("/history"), Input::History);
        assert_eq!(parse_input("/clear"), Input::Unknown("/clear"));
        assert_eq!(
            parse_input("What is Pasal 4 UU PDP?\n"),
            Input::Question("What is Pasal 4 UU PDP?")
        );
    }
}
