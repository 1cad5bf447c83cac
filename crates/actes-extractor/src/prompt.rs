//! LLM prompt engineering for certificate field extraction

/// JSON keys the LLM is asked to fill, in prompt order
pub(crate) const KEY_FULL_NAME: &str = "dead person full name";
pub(crate) const KEY_DATE_OF_DEATH: &str = "Date of death";
pub(crate) const KEY_DECLARANT_NAME: &str = "declarant name";
pub(crate) const KEY_CITY: &str = "declarant City";
pub(crate) const KEY_STREET: &str = "declarant street address";

/// Builds prompts for the LLM to extract certificate fields
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder for recognized page text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. The OCR text, as recognized
        prompt.push_str("Text:\n");
        prompt.push_str(self.text.trim());
        prompt.push_str("\n\n");

        // 2. What to extract and how
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 3. Output format
        prompt.push_str(&output_format());

        prompt
    }
}

fn output_format() -> String {
    let keys = [
        KEY_FULL_NAME,
        KEY_DATE_OF_DEATH,
        KEY_DECLARANT_NAME,
        KEY_CITY,
        KEY_STREET,
    ];
    let body = keys
        .iter()
        .map(|key| format!("    \"{}\": \"\"", key))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "Your response must be a single JSON object in this format:\n\n{{\n{}\n}}\n\n\
         Leave a value empty when the information is not present in the text.",
        body
    )
}

const EXTRACTION_INSTRUCTIONS: &str = r#"Prompt:
1. Filter unnecessary characters like (*, #, ~, etc.).
2. Extract from this French death certificate:
- The full name of the deceased person
- Date of death (date in format dd/mm/yyyy)
- Name of the declarant
- City associated with the declarant
- House number and street address associated with the declarant (without including the city name)

Do not change the name case: first name should be in lower case and LAST NAME should be in upper case.
The declarant's information typically follows a pattern including the title 'Déclarant:' followed by their name and then their address. If there is any misspelling then correct it."#;
