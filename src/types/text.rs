use serde::{Deserialize, Serialize};
use std::fmt::Display;

use inquire::validator::StringValidator;

/// Free text typed by the user as a search query
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text(pub String);

impl Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
struct ValidatorNonEmpty {}
impl StringValidator for ValidatorNonEmpty {
    fn validate(
        &self,
        input: &str,
    ) -> Result<inquire::validator::Validation, inquire::CustomUserError> {
        if input.trim().is_empty() {
            return Ok(inquire::validator::Validation::Invalid(
                "Please enter a valid search query".into(),
            ));
        }
        Ok(inquire::validator::Validation::Valid)
    }
}

impl Text {
    /// Ask for a query on the terminal, rejecting blank input in place.
    /// Returns `None` when the prompt is skipped with escape.
    pub fn create_by_prompt_skippable(prompt: &str) -> anyhow::Result<Option<Self>> {
        let prompt = inquire::Text::new(prompt).with_validator(ValidatorNonEmpty {});
        match prompt.prompt_skippable()? {
            Some(text) => Ok(Some(Text(text))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use inquire::validator::Validation;

    use super::*;

    #[test]
    fn blank_input_is_invalid() {
        let validator = ValidatorNonEmpty {};
        assert!(matches!(
            validator.validate("   ").unwrap(),
            Validation::Invalid(_)
        ));
        assert!(matches!(
            validator.validate(" the hobbit ").unwrap(),
            Validation::Valid
        ));
    }
}
