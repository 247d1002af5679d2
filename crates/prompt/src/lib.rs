//! Prompt system for Lexguide.
//!
//! This crate provides the instructions sent to the completion backend:
//! - Built-in prompt definitions for every pipeline stage
//! - YAML overrides from `.lexguide/prompts/<id>.yml`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{builtin_prompt, PromptSet};
pub use loader::{list_prompts, load_prompt, resolve_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
