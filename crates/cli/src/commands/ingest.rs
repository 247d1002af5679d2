//! Ingest command handler.
//!
//! Chunks every configured corpus and reports what was loaded.

use clap::Args;
use lexguide_core::{config::AppConfig, AppResult};
use lexguide_engine::load_corpora;
use lexguide_knowledge::IngestStats;

/// Chunk the configured corpora and report statistics
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        config.validate()?;

        let (_, stats) = load_corpora(config).await?;
        let missing: Vec<&str> = config
            .corpora
            .iter()
            .filter(|c| !stats.iter().any(|s| s.corpus == c.id))
            .map(|c| c.id.as_str())
            .collect();

        if self.json {
            let output = serde_json::json!({
                "corpora": stats,
                "missing": missing,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        for corpus_stats in &stats {
            println!("{}", format_stats(corpus_stats));
        }
        for id in &missing {
            let dir = config
                .corpora
                .iter()
                .find(|c| c.id == *id)
                .map(|c| config.corpus_dir(c));
            println!("{:<10} directory not found: {:?}", id, dir.unwrap_or_default());
        }

        Ok(())
    }
}

fn format_stats(stats: &IngestStats) -> String {
    format!(
        "{:<10} {} documents, {} chunks, {} failed, {} in {:.2}s",
        stats.corpus,
        stats.documents,
        stats.chunks,
        stats.failed_documents,
        format_bytes(stats.bytes),
        stats.duration_secs
    )
}

fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / (KB * KB))
    }
}
