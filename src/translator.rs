use anyhow::Result;
use tracing::debug;

use crate::backend::{BackendFuture, TranslationBackend};
use crate::languages::LanguageRegistry;
use crate::providers::{Provider, ProviderResponse, ProviderUsage};
use crate::settings::Settings;
use crate::translations::{self, TOOL_NAME, TranslateOptions, tool_spec};

/// LLM-backed translation service bound to one target language.
#[derive(Debug, Clone)]
pub struct Translator<P: Provider> {
    provider: P,
    settings: Settings,
    options: TranslateOptions,
    system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    pub text: String,
    pub model: Option<String>,
    pub usage: Option<ProviderUsage>,
}

impl<P: Provider> Translator<P> {
    pub fn new(
        provider: P,
        settings: Settings,
        registry: &LanguageRegistry,
        options: TranslateOptions,
    ) -> Result<Self> {
        registry.ensure_supported(&options.lang)?;
        let system_prompt =
            translations::render_system_prompt(&options, TOOL_NAME, &settings, registry)?;
        Ok(Self {
            provider,
            settings,
            options,
            system_prompt,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    async fn call_tool(&self, input: &str) -> Result<ProviderResponse> {
        self.provider
            .clone()
            .register_tool(tool_spec(TOOL_NAME))
            .append_system_input(self.system_prompt.clone())
            .append_user_input(input.to_string())
            .call_tool(TOOL_NAME)
            .await
    }

    pub async fn exec(&self, input: &str) -> Result<ExecutionOutput> {
        let response = self.call_tool(input).await?;
        let text = translations::parse_tool_args(response.args, &self.options)?;
        debug!(
            model = response.model.as_deref().unwrap_or("-"),
            total_tokens = response
                .usage
                .as_ref()
                .and_then(|usage| usage.total_tokens)
                .unwrap_or_default(),
            "translated entry"
        );
        Ok(ExecutionOutput {
            text,
            model: response.model,
            usage: response.usage,
        })
    }
}

impl<P: Provider> TranslationBackend for Translator<P> {
    fn target_language(&self) -> &str {
        &self.options.lang
    }

    fn translate<'a>(&'a self, text: &'a str) -> BackendFuture<'a> {
        Box::pin(async move { Ok(self.exec(text).await?.text) })
    }

    // Tool calls return the bare translation.
    fn suffix_artifact_len(&self) -> usize {
        0
    }
}
