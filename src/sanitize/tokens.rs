//! Control tokens emitted by common model backends.

/// Literal control tokens stripped from completions by default.
///
/// Covers sequence boundaries (`<s>`), instruction blocks (`[INST]`),
/// chat-template role markers (`<|im_start|>`, `<|assistant|>`), Llama system
/// sections (`<<SYS>>`), and plain-text role labels.
pub const DEFAULT_CONTROL_TOKENS: &[&str] = &[
    "<s>",
    "</s>",
    "<|s|>",
    "<|/s|>",
    "[OUT]",
    "[/OUT]",
    "[INST]",
    "[/INST]",
    "<|im_start|>",
    "<|im_end|>",
    "<|assistant|>",
    "<|user|>",
    "<|system|>",
    "<<SYS>>",
    "<</SYS>>",
    "###",
    "Assistant:",
    "Human:",
    "User:",
];

/// Orders tokens longest first, dropping empties and duplicates.
///
/// Inner whitespace is collapsed to one space and the ends are trimmed, so a
/// token can still match text that has been whitespace-normalized. Ties keep
/// their original relative order.
pub(crate) fn normalize_tokens<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        let token = super::normalize_whitespace(&token.into());
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out.sort_by(|a, b| b.len().cmp(&a.len()));
    out
}
