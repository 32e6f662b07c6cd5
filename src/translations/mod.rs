use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Value, json};
use tera::{Context as TeraContext, Tera};

use crate::languages::LanguageRegistry;
use crate::providers::ToolSpec;
use crate::settings::Settings;

pub const TOOL_NAME: &str = "deliver_translation";

const SYSTEM_PROMPT: &str = include_str!("prompts/system_prompt.tera");

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub lang: String,
    pub formality: String,
    pub source_lang: String,
}

pub fn tool_spec(tool_name: &str) -> ToolSpec {
    let parameters = json!({
        "type": "object",
        "properties": {
            "translation": {
                "type": "string",
                "description": "The translated msgid value, keeping escape sequences and placeholders."
            },
            "target_language": {"type": "string"}
        },
        "required": ["translation", "target_language"]
    });

    ToolSpec {
        name: tool_name.to_string(),
        description: "Return the translation of one catalog entry.".to_string(),
        parameters,
    }
}

pub fn render_system_prompt(
    options: &TranslateOptions,
    tool_name: &str,
    settings: &Settings,
    registry: &LanguageRegistry,
) -> Result<String> {
    let mut context = TeraContext::new();
    let style = options.formality.trim();
    let guidance = style_guidance(style, settings)?;
    context.insert("source_lang", options.source_lang.trim());
    context.insert("target_lang", options.lang.trim());
    context.insert("target_name", &registry.display_name(&options.lang));
    context.insert("style", style);
    context.insert("style_guidance", &guidance);
    context.insert("tool_name", tool_name);

    Tera::one_off(SYSTEM_PROMPT, &context, false).with_context(|| "failed to render system prompt")
}

/// Validates the tool call and returns the translated text.
pub fn parse_tool_args(value: Value, options: &TranslateOptions) -> Result<String> {
    let args: ToolArgs =
        serde_json::from_value(value).with_context(|| "invalid translation tool arguments")?;
    if args.translation.trim().is_empty() {
        return Err(anyhow!("translation is empty"));
    }
    if args.target_language.trim().is_empty() {
        return Err(anyhow!("target_language is empty"));
    }
    if !same_locale(&args.target_language, &options.lang) {
        return Err(anyhow!(
            "tool response target_language mismatch (expected '{}', got '{}')",
            options.lang,
            args.target_language
        ));
    }
    Ok(args.translation)
}

#[derive(Debug, Deserialize)]
struct ToolArgs {
    translation: String,
    target_language: String,
}

fn style_guidance(formality: &str, settings: &Settings) -> Result<String> {
    if formality.is_empty() {
        return Err(anyhow!("formality is empty"));
    }
    settings
        .formally
        .get(formality)
        .cloned()
        .ok_or_else(|| anyhow!("missing formality guidance for '{}'", formality))
}

// `pt_BR`, `pt-br` and `PT_BR` name the same locale.
fn same_locale(left: &str, right: &str) -> bool {
    let normalize = |code: &str| code.trim().replace('-', "_").to_lowercase();
    normalize(left) == normalize(right)
}
