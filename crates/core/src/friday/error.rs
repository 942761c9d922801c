use thiserror::Error;

/// Errors that can occur when parsing a Friday identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FridayIdError {
    #[error("Malformed Friday id: {0}")]
    Malformed(String),
    #[error("Friday id out of range: {0}")]
    OutOfRange(i64),
    #[error("Not a Friday slot: {0}")]
    NotASlot(i64),
}

/// Errors that can occur when parsing preference labels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("Unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friday_id_error_display() {
        assert_eq!(
            FridayIdError::Malformed("abc".to_string()).to_string(),
            "Malformed Friday id: abc"
        );
        assert_eq!(
            FridayIdError::OutOfRange(-1).to_string(),
            "Friday id out of range: -1"
        );
    }
}
