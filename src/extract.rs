//! Statement text extraction
//!
//! PDF statements go through `pdftotext -raw`, which keeps each table row on
//! one line instead of reflowing columns. Plain `.txt` inputs are assumed to
//! be the output of that step already and are read as-is.

use crate::error::{Result, TxfError};
use crate::tokenizer::RawText;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// Default extraction tool
pub const DEFAULT_TOOL: &str = "pdftotext";

/// Whether `path` is already extracted text
pub fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Load the statement at `path` as raw lines
pub fn load_lines(path: &Path, tool: &str) -> Result<RawText> {
    let text = if is_plain_text(path) {
        fs::read_to_string(path)?
    } else {
        run_tool(path, tool)?
    };
    let raw = RawText::from_text(&text);
    log::debug!("Loaded {} lines from {}", raw.len(), path.display());
    Ok(raw)
}

fn run_tool(path: &Path, tool: &str) -> Result<String> {
    if !path.exists() {
        return Err(TxfError::Io(std::io::Error::new(
            ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )));
    }

    log::debug!("Running {} -raw {} -", tool, path.display());
    let output = Command::new(tool)
        .arg("-raw")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => TxfError::Extraction(format!("'{}' not found on PATH", tool)),
            _ => TxfError::Extraction(format!("failed to run '{}': {}", tool, e)),
        })?;

    if !output.status.success() {
        return Err(TxfError::Extraction(format!(
            "'{}' exited with {}: {}",
            tool,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| TxfError::Extraction(format!("'{}' produced invalid UTF-8: {}", tool, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_text_passthrough() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "02079K107").unwrap();
        writeln!(file, "2 SHARES OF GOOG").unwrap();
        file.flush().unwrap();

        let raw = load_lines(file.path(), "does-not-matter").unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.iter().nth(1), Some("2 SHARES OF GOOG"));
    }

    #[test]
    fn test_missing_tool() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err = load_lines(file.path(), "rusty-txf-no-such-tool").unwrap_err();
        assert!(matches!(err, TxfError::Extraction(_)), "{err:?}");
    }

    #[test]
    fn test_missing_input() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("pdf");
        drop(file);
        let err = load_lines(&path, DEFAULT_TOOL).unwrap_err();
        assert!(matches!(err, TxfError::Io(_)), "{err:?}");
    }

    #[test]
    fn test_extension_check() {
        assert!(is_plain_text(Path::new("statement.TXT")));
        assert!(!is_plain_text(Path::new("statement.pdf")));
        assert!(!is_plain_text(Path::new("statement")));
    }
}
