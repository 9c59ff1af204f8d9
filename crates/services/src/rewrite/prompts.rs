//! Rewriting styles and the prompts sent upstream for each of them

use std::fmt;

/// Instruction shared by every style
pub const SYSTEM_PROMPT: &str = "You are a professional text rewriter. Your task is to rewrite \
the given text according to the specified style while preserving the original meaning and key \
information. Respond only with the rewritten text, no additional commentary.";

pub const INSTRUCTION_STANDARD: &str =
    "Rewrite this text in a clear and natural way while maintaining the original meaning:";
pub const INSTRUCTION_FORMAL: &str =
    "Rewrite this text in a formal, professional tone suitable for business or academic contexts:";
pub const INSTRUCTION_ACADEMIC: &str =
    "Rewrite this text in an academic style with sophisticated vocabulary and scholarly tone:";
pub const INSTRUCTION_EXPANDED: &str =
    "Expand and elaborate on this text, adding more detail and depth while maintaining clarity:";
pub const INSTRUCTION_SUMMARY: &str = "Summarize this text, capturing the main points concisely:";
pub const INSTRUCTION_NARRATIVE: &str =
    "Rewrite this text as a compelling narrative with engaging storytelling elements:";
pub const INSTRUCTION_CREATIVE: &str =
    "Rewrite this text in a creative, imaginative way that captures attention:";

const KEEP_LANGUAGE: &str = "Respond in the same language as the original text.";

/// Rewriting style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteMode {
    #[default]
    Standard,
    Formal,
    Academic,
    Expanded,
    Summary,
    Narrative,
    Creative,
}

impl RewriteMode {
    pub const ALL: [RewriteMode; 7] = [
        RewriteMode::Standard,
        RewriteMode::Formal,
        RewriteMode::Academic,
        RewriteMode::Expanded,
        RewriteMode::Summary,
        RewriteMode::Narrative,
        RewriteMode::Creative,
    ];

    /// Map a client-supplied mode to a style
    ///
    /// Accepts the English identifiers in any case and the Chinese labels the
    /// web client shows. Anything else is treated as `Standard`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "standard" | "标准" => RewriteMode::Standard,
            "formal" | "正式" => RewriteMode::Formal,
            "academic" | "学术" => RewriteMode::Academic,
            "expanded" | "拓展" => RewriteMode::Expanded,
            "summary" | "总结" => RewriteMode::Summary,
            "narrative" | "故事化" => RewriteMode::Narrative,
            "creative" | "创意" => RewriteMode::Creative,
            other => {
                tracing::debug!(mode = %other, "Unknown rewrite mode, using standard");
                RewriteMode::Standard
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteMode::Standard => "standard",
            RewriteMode::Formal => "formal",
            RewriteMode::Academic => "academic",
            RewriteMode::Expanded => "expanded",
            RewriteMode::Summary => "summary",
            RewriteMode::Narrative => "narrative",
            RewriteMode::Creative => "creative",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            RewriteMode::Standard => INSTRUCTION_STANDARD,
            RewriteMode::Formal => INSTRUCTION_FORMAL,
            RewriteMode::Academic => INSTRUCTION_ACADEMIC,
            RewriteMode::Expanded => INSTRUCTION_EXPANDED,
            RewriteMode::Summary => INSTRUCTION_SUMMARY,
            RewriteMode::Narrative => INSTRUCTION_NARRATIVE,
            RewriteMode::Creative => INSTRUCTION_CREATIVE,
        }
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The system/user message pair for one rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePrompt {
    pub system: String,
    pub user: String,
}

pub fn build_prompt(text: &str, mode: RewriteMode, language: Option<&str>) -> RewritePrompt {
    let mut user = format!("{}\n\n\"{}\"", mode.instruction(), text);

    match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => {
            user.push_str("\n\nRespond in the language identified by the locale code \"");
            user.push_str(language);
            user.push_str("\".");
        }
        None => {
            user.push_str("\n\n");
            user.push_str(KEEP_LANGUAGE);
        }
    }

    RewritePrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
