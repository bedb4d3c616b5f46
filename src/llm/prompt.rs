/// Instruction prompt for one extraction call.
pub fn build_extraction_prompt(query: &str, relevant_text: &str) -> String {
    format!(
        "You are a data extraction assistant. Extract the following information from the provided text content:\n\
         Query: {query}\n\
         \n\
         Text Content:\n\
         {relevant_text}\n\
         \n\
         Return the extracted data in JSON format. If no data is found, return an empty JSON object.\n\
         Also, provide a brief summary of what was extracted.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_query_and_text() {
        let prompt = build_extraction_prompt("list degrees", "BSc Physics. MSc Maths.");
        assert!(prompt.contains("Query: list degrees\n"));
        assert!(prompt.contains("Text Content:\nBSc Physics. MSc Maths.\n"));
        assert!(prompt.contains("JSON format"));
        assert!(prompt.contains("brief summary"));
    }
}
