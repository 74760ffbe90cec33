//! Visibility label errors

use thiserror::Error;

/// Result type for label operations
pub type LabelResult<T> = Result<T, LabelError>;

/// Label parse / combination errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// Label is not a valid expression
    #[error("malformed visibility label '{label}' at byte {position}: {reason}")]
    Malformed {
        label: String,
        position: usize,
        reason: &'static str,
    },
}

impl LabelError {
    pub(crate) fn malformed(label: &[u8], position: usize, reason: &'static str) -> Self {
        Self::Malformed {
            label: String::from_utf8_lossy(label).into_owned(),
            position,
            reason,
        }
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "SCAN_LABEL_MALFORMED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_label_and_position() {
        let err = LabelError::malformed(b"A&&B", 2, "expected term");
        let display = err.to_string();
        assert!(display.contains("A&&B"));
        assert!(display.contains("byte 2"));
        assert_eq!(err.code(), "SCAN_LABEL_MALFORMED");
    }
}
