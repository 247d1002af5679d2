//! Built-in prompt definitions for every pipeline stage.

use crate::loader::resolve_prompt;
use crate::types::PromptDefinition;
use lexguide_core::AppResult;
use std::path::Path;

pub const SOURCE_SELECT: &str = "source.select";
pub const ANSWER_SYNTHESIZE: &str = "answer.synthesize";
pub const RELEVANCE_CHECK: &str = "relevance.check";
pub const ANSWER_GENERAL: &str = "answer.general";

const SOURCE_SELECT_SYSTEM: &str = "\
You are a source selector for a legal AI assistant. Your job is to select the most relevant \
retrieval sources for answering legal questions.

Available sources:
{{sources}}

Instructions:
1. Analyze the user's question
2. Select the 1-3 most relevant sources
3. Respond with a bracketed list of source identifiers and nothing else, e.g. ['gdpr'] or ['gdpr', 'pdp'] or ['web']
4. Prefer document sources over web search when possible
5. Use web search for recent developments or when specific information might not be in documents";

const ANSWER_SYNTHESIZE_SYSTEM: &str = "\
You are an expert legal advisor specializing in data protection and privacy law. Your role is \
to provide accurate, comprehensive, and practical legal guidance.

Guidelines:
1. Accuracy: base your answers strictly on the provided source information
2. Clarity: explain complex legal concepts in clear, understandable terms
3. Practicality: provide actionable guidance when appropriate
4. Citations: reference specific regulations, articles, or sections when the sources mention them
5. Disclaimers: remind users to consult legal professionals for specific cases

Structure your response as: a direct answer, the legal basis, practical implications, \
recommendations, and any important caveats.";

const RELEVANCE_CHECK_SYSTEM: &str = "\
You are a relevance evaluator. Your job is to determine if web search content is relevant to a \
legal question about data protection.

Respond with exactly \"relevant\" or \"not relevant\". Content is relevant only if it directly \
addresses the question or gives useful, current legal information about it. Be strict.";

const ANSWER_GENERAL_SYSTEM: &str =
    "You are a legal expert. Provide general guidance based on your knowledge.";

fn definition(id: &str, title: &str, system: &str, template: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        system: system.to_string(),
        template: template.to_string(),
    }
}

/// Look up a built-in prompt definition by ID.
pub fn builtin_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    let def = match prompt_id {
        SOURCE_SELECT => definition(
            SOURCE_SELECT,
            "Retrieval source selection",
            SOURCE_SELECT_SYSTEM,
            "User question: {{question}}",
        ),
        ANSWER_SYNTHESIZE => definition(
            ANSWER_SYNTHESIZE,
            "Answer synthesis from retrieved sources",
            ANSWER_SYNTHESIZE_SYSTEM,
            "Source Information:\n{{sources}}\n\nQuestion: {{question}}",
        ),
        RELEVANCE_CHECK => definition(
            RELEVANCE_CHECK,
            "Web result relevance check",
            RELEVANCE_CHECK_SYSTEM,
            "Query: {{question}}\n\nContent:\n{{content}}",
        ),
        ANSWER_GENERAL => definition(
            ANSWER_GENERAL,
            "General-knowledge answer",
            ANSWER_GENERAL_SYSTEM,
            "Please provide general guidance on: {{question}}",
        ),
        _ => return None,
    };
    Some(def)
}

/// The four prompts the question-answering pipeline needs.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub select: PromptDefinition,
    pub synthesize: PromptDefinition,
    pub relevance: PromptDefinition,
    pub general: PromptDefinition,
}

impl PromptSet {
    /// Built-in prompts only.
    pub fn builtin() -> Self {
        Self {
            select: builtin_definition(SOURCE_SELECT),
            synthesize: builtin_definition(ANSWER_SYNTHESIZE),
            relevance: builtin_definition(RELEVANCE_CHECK),
            general: builtin_definition(ANSWER_GENERAL),
        }
    }

    /// Built-in prompts with workspace overrides applied.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        Ok(Self {
            select: resolve_prompt(workspace, SOURCE_SELECT)?,
            synthesize: resolve_prompt(workspace, ANSWER_SYNTHESIZE)?,
            relevance: resolve_prompt(workspace, RELEVANCE_CHECK)?,
            general: resolve_prompt(workspace, ANSWER_GENERAL)?,
        })
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_definition(prompt_id: &str) -> PromptDefinition {
    builtin_prompt(prompt_id).unwrap_or_else(|| {
        // Every id above is matched in builtin_prompt
        definition(prompt_id, prompt_id, "", "{{question}}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_prompt;
    use std::collections::HashMap;

    #[test]
    fn test_every_stage_has_a_builtin() {
        for id in [SOURCE_SELECT, ANSWER_SYNTHESIZE, RELEVANCE_CHECK, ANSWER_GENERAL] {
            let def = builtin_prompt(id).unwrap();
            assert_eq!(def.id, id);
            assert!(!def.system.is_empty());
        }
        assert!(builtin_prompt("unknown").is_none());
    }

    #[test]
    fn test_select_prompt_lists_sources() {
        let set = PromptSet::builtin();
        let mut vars = HashMap::new();
        vars.insert("sources".to_string(), "- 'gdpr': GDPR\n- 'web': web search".to_string());
        vars.insert("question".to_string(), "What is Article 17?".to_string());

        let built = build_prompt(&set.select, vars).unwrap();
        assert!(built.system.contains("- 'gdpr': GDPR"));
        assert!(built.system.contains("bracketed list"));
        assert_eq!(built.user, "User question: What is Article 17?");
    }

    #[test]
    fn test_synthesis_template_puts_question_last() {
        let set = PromptSet::builtin();
        let mut vars = HashMap::new();
        vars.insert("sources".to_string(), "--- GDPR SOURCE ---\ntext".to_string());
        vars.insert("question".to_string(), "Q?".to_string());

        let built = build_prompt(&set.synthesize, vars).unwrap();
        assert!(built.user.ends_with("Question: Q?"));
        assert!(built.user.starts_with("Source Information:"));
    }
}
