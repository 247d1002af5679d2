//! Sources command handler.
//!
//! Lists the retrieval sources a question can be routed to, optionally
//! probing each one with a test query.

use clap::Args;
use lexguide_core::{config::AppConfig, AppResult};
use lexguide_engine::{load_corpora, web_source};
use lexguide_knowledge::{probe, SourceKind};

/// List retrieval sources and their trigger terms
#[derive(Args, Debug)]
pub struct SourcesCommand {
    /// Call every source with this query and report what comes back
    #[arg(long)]
    pub probe: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SourcesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing sources command");
        config.validate()?;

        let (mut sources, _) = load_corpora(config).await?;
        if let Some(web) = web_source(config)? {
            sources.push(web);
        }

        let mut rows = Vec::with_capacity(sources.len());
        for source in &sources {
            let report = match self.probe {
                Some(ref query) => Some(probe(source.as_ref(), query).await),
                None => None,
            };
            rows.push((source, report));
        }

        if self.json {
            let output: Vec<_> = rows
                .iter()
                .map(|(source, report)| {
                    serde_json::json!({
                        "id": source.id().as_str(),
                        "kind": source.kind(),
                        "description": source.description(),
                        "triggers": source.triggers(),
                        "probe": report,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        for (source, report) in &rows {
            let kind = match source.kind() {
                SourceKind::Corpus => "corpus",
                SourceKind::Web => "web",
            };
            println!("{} ({})", source.id(), kind);
            println!("  {}", source.description());
            if !source.triggers().is_empty() {
                println!("  triggers: {}", source.triggers().join(", "));
            }
            if let Some(report) = report {
                println!(
                    "  probe: {}",
                    if report.has_result {
                        format!("{} chars", report.result_length)
                    } else {
                        "no result".to_string()
                    }
                );
            }
        }

        if config.web_search.enabled && !sources.iter().any(|s| s.kind() == SourceKind::Web) {
            println!(
                "\nWeb search is not configured; set {} to enable it.",
                config.web_search.api_key_env
            );
        }

        Ok(())
    }
}
