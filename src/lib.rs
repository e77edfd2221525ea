//! # rusty-txf
//!
//! Converts brokerage Form 1099-B statements into TXF (Tax Exchange Format)
//! records that tax preparation software can import.
//!
//! The statement text (as produced by `pdftotext -raw`) flows one way:
//! lines are tokenized, tax lot records are parsed from the tokens, the
//! records are totalled per Form 8949 category, and finally rendered as a
//! TXF document. Any malformed record aborts the whole conversion; a
//! partially converted tax file is never produced.
//!
//! ## Example
//!
//! ```rust
//! use rusty_txf::prelude::*;
//!
//! let text = RawText::from_text(
//!     "02079K107\n2 SHARES OF GOOG\n01/27/2020 2,933.94 2,933.42 X\n02/06/2020 GROSS\n",
//! );
//! let conversion = convert(&text, &ConvertOptions::default()).unwrap();
//! assert_eq!(conversion.records.len(), 1);
//! assert!(conversion.document.to_string().contains("$2933.94"));
//! ```

pub mod aggregate;
pub mod category;
pub mod error;
pub mod extract;
pub mod parser;
pub mod record;
pub mod security;
pub mod tokenizer;
pub mod txf;

use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::aggregate::{Summary, Totals};
    pub use crate::category::Category;
    pub use crate::error::{Result, TxfError};
    pub use crate::parser::Layout;
    pub use crate::record::TaxLot;
    pub use crate::security::Symbol;
    pub use crate::tokenizer::RawText;
    pub use crate::txf::TxfDocument;
    pub use crate::{convert, write_output, Conversion, ConvertOptions};
}

use aggregate::Summary;
use error::{Result, TxfError};
use parser::Layout;
use record::TaxLot;
use tokenizer::RawText;
use txf::{TxfDocument, TxfStyle};

/// Extension required of output files
pub const OUTPUT_EXTENSION: &str = "txf";

/// Conversion settings
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub layout: Layout,
    /// TXF `A` header value
    pub account: String,
    /// Override the layout's default sale-date ordering
    pub sort: Option<bool>,
    /// Date written in the TXF header
    pub generated: NaiveDate,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Auto,
            account: "Self".to_string(),
            sort: None,
            generated: chrono::Local::now().date_naive(),
        }
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Layout the input was parsed with
    pub layout: Layout,
    /// Records in output order
    pub records: Vec<TaxLot>,
    pub summary: Summary,
    pub document: TxfDocument,
}

/// Parse, total and render a statement
pub fn convert(text: &RawText, options: &ConvertOptions) -> Result<Conversion> {
    let layout = options.layout.resolve(text);
    let mut records = parser::parse_records(text, layout)?;
    if records.is_empty() {
        return Err(TxfError::NoRecords);
    }

    let sort = options.sort.unwrap_or_else(|| layout.sorts_by_default());
    let summary = aggregate::aggregate(&mut records, sort);
    let document = txf::render(
        &records,
        &options.account,
        options.generated,
        TxfStyle::for_layout(layout),
    );

    Ok(Conversion {
        layout,
        records,
        summary,
        document,
    })
}

/// Reject output paths that do not end in `.txf`
pub fn check_output_path(path: &Path) -> Result<()> {
    let ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
    if ok {
        Ok(())
    } else {
        Err(TxfError::Usage(format!(
            "unexpected output file format: {} (expected .{})",
            path.display(),
            OUTPUT_EXTENSION
        )))
    }
}

/// Write the document to `path` in one step.
///
/// The content goes to a temporary file next to `path` which then replaces
/// it, so a failed write never leaves a truncated tax file behind.
pub fn write_output(document: &TxfDocument, path: &Path) -> Result<()> {
    check_output_path(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(document.to_string().as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| TxfError::Io(e.error))?;

    log::info!("Wrote {} records to {}", document.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_output_path() {
        assert!(check_output_path(Path::new("out.txf")).is_ok());
        assert!(check_output_path(Path::new("dir/OUT.TXF")).is_ok());
        assert!(matches!(
            check_output_path(Path::new("out.csv")),
            Err(TxfError::Usage(_))
        ));
        assert!(check_output_path(Path::new("out")).is_err());
    }

    #[test]
    fn test_empty_statement_is_an_error() {
        let text = RawText::from_text("nothing to see\n");
        let err = convert(&text, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, TxfError::NoRecords));
    }
}
