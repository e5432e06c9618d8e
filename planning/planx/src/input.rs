/// Textual source of model elements, kept around to render diagnostics.
pub struct Input {
    pub(crate) text: String,
    /// Name of the file the text was read from, if any.
    pub(crate) source: Option<String>,
}

impl Input {
    pub fn from_string(input: impl ToString) -> Input {
        Input {
            text: input.to_string(),
            source: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::from_string(s)
    }
}
