//! Command handlers for the Lexguide CLI.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod sources;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use sources::SourcesCommand;

use lexguide_core::{AppError, AppResult};
use std::path::Path;

/// Read a context file passed with `--context-file`.
pub(crate) fn read_context_file(path: Option<&Path>) -> AppResult<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let context = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read context file {:?}: {}", path, e))
    })?;

    tracing::debug!("Loaded {} bytes of user context from {:?}", context.len(), path);
    Ok(Some(context))
}
