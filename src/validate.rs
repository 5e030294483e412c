//! Pre-encode text gate.

use crate::error::EncodeError;

/// Rejects text that should never reach the encoder: empty strings and control characters.
///
/// Characters outside ISO-8859-1 pass this gate; the bitstream stage reports them as
/// [`EncodeError::UnsupportedCharacter`] with their position.
pub fn validate_text(text: &str) -> Result<(), EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::invalid_input("text is empty"));
    }
    if let Some((position, c)) = text.chars().enumerate().find(|(_, c)| c.is_control()) {
        return Err(EncodeError::invalid_input(format!(
            "control character {:?} at position {}",
            c, position
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_latin1() {
        assert!(validate_text("Scan me!").is_ok());
        assert!(validate_text("¡Hola, señor!").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(validate_text(""), Err(EncodeError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_control() {
        let err = validate_text("line\nbreak").unwrap_err();
        assert_eq!(err.to_string(), "invalid input: control character '\\n' at position 4");
    }
}
