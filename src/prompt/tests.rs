use super::*;

#[test]
fn test_template_per_family() {
    assert_eq!(
        PromptTemplate::for_provider(ProviderId::Openai),
        PromptTemplate::OpenAiChat
    );
    assert_eq!(
        PromptTemplate::for_provider(ProviderId::Gemini),
        PromptTemplate::GeminiSingle
    );
    assert_eq!(
        PromptTemplate::for_provider(ProviderId::Deepl),
        PromptTemplate::DeepLTranslate
    );
}

#[test]
fn test_openai_chat_prompt_by_classification() {
    let request = PromptTemplate::OpenAiChat.build_request(
        "gpt-4",
        "Hello",
        "French",
        Classification::Translation,
    );
    assert_eq!(
        request.prompt,
        Prompt::Chat {
            system: "Translate this sentence into French".to_string(),
            user: "Hello".to_string(),
        }
    );
    assert_eq!(request.temperature, Some(0.3));
    assert_eq!(request.max_output_tokens, Some(100));

    let question = PromptTemplate::OpenAiChat.build_prompt(
        "What is a monad?",
        "German",
        Classification::Question,
    );
    assert_eq!(
        question,
        Prompt::Chat {
            system: "Explain in short in German".to_string(),
            user: "What is a monad?".to_string(),
        }
    );
}

#[test]
fn test_gemini_single_prompt_by_classification() {
    let request = PromptTemplate::GeminiSingle.build_request(
        "gemini-1.5-pro-001",
        "Hello",
        "French",
        Classification::Translation,
    );
    assert_eq!(
        request.prompt,
        Prompt::Single {
            text: "Translate the text: Hello into French without description".to_string(),
        }
    );
    assert_eq!(request.temperature, None);
    assert_eq!(request.max_output_tokens, None);

    assert_eq!(
        PromptTemplate::GeminiSingle.build_prompt("Why is the sky blue?", "Spanish", Classification::Question),
        Prompt::Single {
            text: "Why is the sky blue? into Spanish, explain in short".to_string(),
        }
    );
}

#[test]
fn test_deepl_translate_prompt_carries_language_name() {
    let request = PromptTemplate::DeepLTranslate.build_request(
        "deepl",
        "Hello",
        "Japanese",
        Classification::Translation,
    );
    assert_eq!(
        request.prompt,
        Prompt::Translate {
            text: "Hello".to_string(),
            target_language: "Japanese".to_string(),
        }
    );
}
