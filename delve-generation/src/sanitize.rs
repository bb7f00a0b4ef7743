//! Cleanup of raw backend output

use regex::Regex;
use std::sync::LazyLock;

static INSTRUCTION_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[/?INST\]").expect("valid instruction token pattern"));

static MARKUP_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid markup tag pattern"));

/// Turn raw backend stdout into clean text.
///
/// Strips `[INST]`/`[/INST]` tokens and `<...>` artifacts. When the model
/// echoed the prompt, everything up to and including its last occurrence is
/// dropped.
pub fn sanitize_output(raw: &str, prompt: &str) -> String {
    let output = raw.trim();
    let output = INSTRUCTION_TOKENS.replace_all(output, "");
    let output = MARKUP_TAGS.replace_all(&output, "");

    if prompt.is_empty() {
        return output.into_owned();
    }

    match output.rfind(prompt) {
        Some(index) => output[index + prompt.len()..].trim().to_string(),
        None => output.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_instruction_tokens() {
        let cleaned = sanitize_output("[INST] hello [/INST] world", "unrelated");
        assert_eq!(cleaned, " hello  world");
    }

    #[test]
    fn test_strips_markup_artifacts() {
        let cleaned = sanitize_output("<s>Cats are mammals.</s>", "unrelated");
        assert_eq!(cleaned, "Cats are mammals.");
    }

    #[test]
    fn test_drops_echoed_prompt() {
        let prompt = "Summarize cats.";
        let raw = format!("{} Cats purr.", prompt);
        assert_eq!(sanitize_output(&raw, prompt), "Cats purr.");
    }

    #[test]
    fn test_keeps_text_after_last_echo() {
        let prompt = "Q:";
        let raw = "Q: first Q: second";
        assert_eq!(sanitize_output(raw, prompt), "second");
    }

    #[test]
    fn test_echo_only_output_is_empty() {
        assert_eq!(sanitize_output("  Tell me  ", "Tell me"), "");
    }

    #[test]
    fn test_plain_output_is_trimmed() {
        assert_eq!(sanitize_output("\n  plain answer \n", "prompt"), "plain answer");
    }
}
