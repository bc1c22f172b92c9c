// Credential collection: the access token and the 9-digit identifier.
// Validation is kept apart from prompting so the rules can be tested
// without a terminal.

use std::io;

use crate::error::InputValidationError;
use crate::ui::Terminal;

/// Tokens must be strictly longer than this many characters.
pub const MIN_TOKEN_LENGTH: usize = 25;
pub const IDENTIFIER_LENGTH: usize = 9;

pub fn validate_token(input: &str) -> Result<(), InputValidationError> {
    if input.chars().count() > MIN_TOKEN_LENGTH {
        Ok(())
    } else {
        Err(InputValidationError::TokenTooShort)
    }
}

pub fn validate_identifier(input: &str) -> Result<(), InputValidationError> {
    if input.len() == IDENTIFIER_LENGTH && input.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(InputValidationError::MalformedIdentifier)
    }
}

/// Prompts until the token passes `validate_token`.
pub fn collect_token(term: &mut dyn Terminal) -> io::Result<String> {
    term.input("Please enter your API Token from WSO2", &validate_token)
}

/// Prompts until a 9-digit identifier is entered. The value stays a string
/// so leading zeros survive.
pub fn collect_identifier(term: &mut dyn Terminal) -> io::Result<String> {
    term.input("Please enter your BYU ID Number", &validate_identifier)
}
