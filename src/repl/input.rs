// ABOUTME: REPL input handling — slash-command parsing and the prompt field buffer.
// ABOUTME: Plain lines are prompts; `/voice` fills the field, `/send` submits it.

/// What a line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Put the text in the prompt field and submit it.
    Submit(String),
    /// Fill the prompt field from speech recognition.
    Voice,
    /// Submit the prompt field as it is.
    SendField,
    /// Reprint the whole transcript.
    History,
    Quit,
    Unknown(String),
}

/// Parse one line of input.
pub fn parse_line(line: &str) -> InputAction {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return InputAction::Submit(line.to_string());
    }
    match trimmed {
        "/voice" | "/mic" => InputAction::Voice,
        "/send" => InputAction::SendField,
        "/history" => InputAction::History,
        "/quit" | "/exit" => InputAction::Quit,
        other => InputAction::Unknown(other.to_string()),
    }
}

/// The editable prompt text.
#[derive(Debug, Default)]
pub struct PromptField {
    text: String,
}

impl PromptField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_prompts() {
        assert_eq!(
            parse_line("what is rust?"),
            InputAction::Submit("what is rust?".to_string())
        );
        assert_eq!(parse_line(""), InputAction::Submit(String::new()));
    }

    #[test]
    fn commands() {
        assert_eq!(parse_line("/voice"), InputAction::Voice);
        assert_eq!(parse_line(" /send "), InputAction::SendField);
        assert_eq!(parse_line("/history"), InputAction::History);
        assert_eq!(parse_line("/quit"), InputAction::Quit);
        assert_eq!(parse_line("/nope"), InputAction::Unknown("/nope".to_string()));
    }

    #[test]
    fn field_set_and_clear() {
        let mut field = PromptField::default();
        field.set("draft");
        assert_eq!(field.text(), "draft");
        field.clear();
        assert_eq!(field.text(), "");
    }
}
