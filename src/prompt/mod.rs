//! Per-family prompt templates.
//!
//! Each provider family phrases the same form input differently: OpenAI gets a
//! system instruction plus the raw message, Gemini a single sentence, DeepL a
//! plain translation request.

use crate::core::types::{Classification, Prompt, ProviderId, ProviderRequest};

pub const CHAT_TEMPERATURE: f32 = 0.3;
pub const CHAT_MAX_OUTPUT_TOKENS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    OpenAiChat,
    GeminiSingle,
    DeepLTranslate,
}

impl PromptTemplate {
    pub fn for_provider(provider: ProviderId) -> Self {
        match provider {
            ProviderId::Openai => Self::OpenAiChat,
            ProviderId::Gemini => Self::GeminiSingle,
            ProviderId::Deepl => Self::DeepLTranslate,
        }
    }

    pub fn build_prompt(
        self,
        message: &str,
        language: &str,
        classification: Classification,
    ) -> Prompt {
        match self {
            Self::OpenAiChat => {
                let system = if classification.is_translation() {
                    format!("Translate this sentence into {language}")
                } else {
                    format!("Explain in short in {language}")
                };
                Prompt::Chat {
                    system,
                    user: message.to_string(),
                }
            }
            Self::GeminiSingle => {
                let text = if classification.is_translation() {
                    format!("Translate the text: {message} into {language} without description")
                } else {
                    format!("{message} into {language}, explain in short")
                };
                Prompt::Single { text }
            }
            Self::DeepLTranslate => Prompt::Translate {
                text: message.to_string(),
                target_language: language.to_string(),
            },
        }
    }

    pub fn build_request(
        self,
        model_id: &str,
        message: &str,
        language: &str,
        classification: Classification,
    ) -> ProviderRequest {
        let (temperature, max_output_tokens) = match self {
            Self::OpenAiChat => (Some(CHAT_TEMPERATURE), Some(CHAT_MAX_OUTPUT_TOKENS)),
            Self::GeminiSingle | Self::DeepLTranslate => (None, None),
        };

        ProviderRequest {
            model_id: model_id.to_string(),
            prompt: self.build_prompt(message, language, classification),
            temperature,
            max_output_tokens,
        }
    }
}

#[cfg(test)]
mod tests;
