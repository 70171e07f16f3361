//! Persona prompt for the oracle model.

/// Persona preamble that precedes every question.
pub const PERSONA_DIRECTIVE: &str = "You are Oracle Koala, a wise but cheeky Australian koala. \
Answer clearly but sprinkle in Aussie slang, eucalyptus/gumtree references, \
and playful humor. Some responses should be short and snappy, some can be detailed.";

/// Build the full completion prompt for a question.
pub fn build_prompt(persona: &str, question: &str) -> String {
    format!("{persona}\n\nUser: {question}\nKoala:")
}

/// Remove every echo of the prompt from the model output and trim what remains.
pub fn strip_prompt(output: &str, prompt: &str) -> String {
    if prompt.is_empty() {
        return output.trim().to_string();
    }

    output.replace(prompt, "").trim().to_string()
}
