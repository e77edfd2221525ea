//! Security registry: the fixed set of identifiers (CUSIPs) this crate accepts

use std::fmt;
use std::str::FromStr;

/// Length of a CUSIP security identifier
pub const IDENTIFIER_LEN: usize = 9;

/// Supported ticker symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Alphabet Class A
    GOOGL,
    /// Alphabet Class C
    GOOG,
}

impl Symbol {
    /// Ticker as printed on the statement
    pub fn ticker(&self) -> &'static str {
        match self {
            Symbol::GOOGL => "GOOGL",
            Symbol::GOOG => "GOOG",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticker())
    }
}

impl FromStr for Symbol {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GOOGL" => Ok(Symbol::GOOGL),
            "GOOG" => Ok(Symbol::GOOG),
            _ => Err(()),
        }
    }
}

/// Identifier -> symbol pairs. Both the pre-2015 and current CUSIP sets appear
/// on historical statements.
const REGISTRY: &[(&str, Symbol)] = &[
    ("02079K305", Symbol::GOOGL),
    ("38259P508", Symbol::GOOGL),
    ("02079K107", Symbol::GOOG),
    ("38259P706", Symbol::GOOG),
];

/// Identifier prefixes that mark the start of a record
const PREFIXES: &[&str] = &["0207", "3825"];

/// Look up the symbol for an exact identifier
pub fn lookup(identifier: &str) -> Option<Symbol> {
    REGISTRY
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, symbol)| *symbol)
}

/// Whether a line looks like an identifier line.
///
/// The line must hold a single CUSIP-shaped token starting with a registry
/// prefix. It may still fail the exact [`lookup`].
pub fn is_candidate(line: &str) -> bool {
    let line = line.trim();
    line.len() == IDENTIFIER_LEN
        && line.chars().all(|c| c.is_ascii_alphanumeric())
        && PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("02079K107"), Some(Symbol::GOOG));
        assert_eq!(lookup("02079K305"), Some(Symbol::GOOGL));
        assert_eq!(lookup("38259P706"), Some(Symbol::GOOG));
        assert_eq!(lookup("02079K999"), None);
    }

    #[test]
    fn test_candidate_lines() {
        assert!(is_candidate("02079K107"));
        assert!(is_candidate("  38259P508  "));
        // Prefix matches but not in the registry: still a candidate
        assert!(is_candidate("02079K999"));
        assert!(!is_candidate("02079K107 2 SHARES"));
        assert!(!is_candidate("12345678A"));
        assert!(!is_candidate("0207"));
    }

    #[test]
    fn test_symbol_parsing() {
        assert_eq!("GOOG".parse::<Symbol>(), Ok(Symbol::GOOG));
        assert_eq!("GOOGL".parse::<Symbol>(), Ok(Symbol::GOOGL));
        assert!("goog".parse::<Symbol>().is_err());
        assert!("AAPL".parse::<Symbol>().is_err());
    }
}
