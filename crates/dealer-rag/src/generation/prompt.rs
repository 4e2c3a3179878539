//! Prompt templates for grounded generation

/// Prompt builder for database-grounded answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the grounding prompt
    ///
    /// Context and question are embedded verbatim.
    pub fn build_grounded_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Based on the following database information:

{context}

Please answer this question: {question}

Provide a detailed response using only the information from the database context above. If the information is not available in the context, say so."#,
            context = context,
            question = question
        )
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
