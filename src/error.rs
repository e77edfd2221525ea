//! Error types for rusty-txf

use thiserror::Error;

/// Main error type for rusty-txf
///
/// Every failure is fatal to the whole conversion. Record-level variants carry
/// the 1-based input line number so the offending statement line can be found.
#[derive(Error, Debug)]
pub enum TxfError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Error parsing input line {line}: {content} (expected {expected})")]
    Parse {
        line: usize,
        content: String,
        expected: String,
    },

    #[error("Unexpected end of input after line {line}")]
    UnexpectedEof { line: usize },

    #[error("Could not determine applicable Form 8949 checkbox for line {line}: {content}")]
    MissingCategory { line: usize, content: String },

    #[error("Unknown security identifier on line {line}: {identifier}")]
    UnknownIdentifier { line: usize, identifier: String },

    #[error("Unknown symbol on line {line}: {symbol}")]
    UnknownSymbol { line: usize, symbol: String },

    #[error("Unexpected (symbol, identifier) pair on line {line}: ({symbol}, {identifier})")]
    SymbolMismatch {
        line: usize,
        identifier: String,
        symbol: String,
    },

    #[error("Invalid share quantity on line {line}: {value}")]
    InvalidQuantity { line: usize, value: String },

    #[error("Invalid amount on line {line}: {value}")]
    InvalidAmount { line: usize, value: String },

    #[error("Invalid date on line {line}: {value} (expected MM/DD/YYYY)")]
    InvalidDate { line: usize, value: String },

    #[error("No 1099-B records found")]
    NoRecords,

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TxfError {
    /// Whether a layout rule failed to match rather than finding bad data.
    ///
    /// Only structural failures let the parser try the next layout rule.
    pub fn is_structural(&self) -> bool {
        matches!(self, TxfError::Parse { .. } | TxfError::UnexpectedEof { .. })
    }

    /// Input line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            TxfError::Parse { line, .. }
            | TxfError::UnexpectedEof { line }
            | TxfError::MissingCategory { line, .. }
            | TxfError::UnknownIdentifier { line, .. }
            | TxfError::UnknownSymbol { line, .. }
            | TxfError::SymbolMismatch { line, .. }
            | TxfError::InvalidQuantity { line, .. }
            | TxfError::InvalidAmount { line, .. }
            | TxfError::InvalidDate { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type alias for rusty-txf operations
pub type Result<T> = std::result::Result<T, TxfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_has_line_and_content() {
        let err = TxfError::Parse {
            line: 42,
            content: "2 SHARES OF GOOG".to_string(),
            expected: "acquisition date".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 42"));
        assert!(msg.contains("2 SHARES OF GOOG"));
        assert!(msg.contains("acquisition date"));
    }

    #[test]
    fn test_structural_classification() {
        assert!(TxfError::UnexpectedEof { line: 3 }.is_structural());
        assert!(!TxfError::InvalidQuantity {
            line: 3,
            value: "0".to_string()
        }
        .is_structural());
        assert!(!TxfError::NoRecords.is_structural());
    }

    #[test]
    fn test_line_accessor() {
        let err = TxfError::SymbolMismatch {
            line: 7,
            identifier: "02079K305".to_string(),
            symbol: "GOOG".to_string(),
        };
        assert_eq!(err.line(), Some(7));
        assert_eq!(TxfError::NoRecords.line(), None);
    }
}
