//! Ask command handler.
//!
//! Answers a single question through the full pipeline.

use super::read_context_file;
use clap::Args;
use lexguide_core::{config::AppConfig, AppResult};
use lexguide_engine::EngineBuilder;
use std::path::PathBuf;

/// Ask a legal question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// File with extra context to include in the prompt
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let context = read_context_file(self.context_file.as_deref())?;
        let engine = EngineBuilder::from_config(config).await?;
        let session = engine.new_session();

        let answer = engine
            .answer(&session, &self.question, context.as_deref())
            .await;

        if self.json {
            let sources: Vec<String> = engine.sources().ids().iter().map(|id| id.to_string()).collect();
            let output = serde_json::json!({
                "question": self.question,
                "answer": answer,
                "sessionId": session.id().to_string(),
                "provider": config.llm.provider,
                "model": config.llm.model,
                "sources": sources,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}
