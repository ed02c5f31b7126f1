/// Wrap extracted content and the user's question in the completion prompt.
///
/// The content is embedded whole; nothing is truncated.
pub fn build_prompt(content: &str, question: &str) -> String {
    format!("Here is the data:\n{content}\n\nQuestion: {question}\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("   Region  Total Revenue\n0    Asia            100", "Which region?");
        assert!(prompt.starts_with("Here is the data:\n   Region"));
        assert!(prompt.contains("0    Asia            100\n\nQuestion: Which region?"));
        assert!(prompt.ends_with("\nAnswer:"));
    }

    #[test]
    fn test_empty_content_still_well_formed() {
        assert_eq!(
            build_prompt("", "Summarize"),
            "Here is the data:\n\n\nQuestion: Summarize\nAnswer:"
        );
    }
}
