//! TXF (Tax Exchange Format) v042 output
//!
//! A TXF document is a sequence of records, each a list of one-character
//! field codes followed by their value and terminated by a `^` line:
//!
//! ```text
//! TD              Detailed record
//! N711            Refnumber (Form 8949 category)
//! C1              Copy number
//! L1              Line number
//! P2 GOOG         Description of property
//! D01/27/2020     Date acquired
//! D02/06/2020     Date sold
//! $2933.42        Cost basis
//! $2933.94        Proceeds
//! $200.00         Wash sale loss disallowed (optional)
//! ^
//! ```

use crate::parser::Layout;
use crate::record::{TaxLot, DATE_FORMAT};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// TXF format version written in the header
pub const TXF_VERSION: &str = "042";

/// Record terminator
pub const END_OF_RECORD: &str = "^";

/// Field list of a single TXF record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxfRecord {
    fields: Vec<(char, String)>,
}

impl TxfRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn field(mut self, code: char, value: impl fmt::Display) -> Self {
        self.fields.push((code, value.to_string()));
        self
    }

    /// Append an amount field, always with two decimals
    pub fn amount(self, value: Decimal) -> Self {
        self.field('$', format!("{:.2}", value))
    }

    /// Append a date field
    pub fn date(self, value: NaiveDate) -> Self {
        self.field('D', value.format(DATE_FORMAT))
    }
}

impl fmt::Display for TxfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (code, value) in &self.fields {
            writeln!(f, "{}{}", code, value)?;
        }
        writeln!(f, "{}", END_OF_RECORD)
    }
}

/// Per-layout details of the detail records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxfStyle {
    /// Write `C1` / `L1` copy and line numbers
    pub copy_and_line: bool,
    /// Describe the property as `<quantity> <symbol>` instead of the statement text
    pub short_description: bool,
}

impl TxfStyle {
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::SelfContained => Self {
                copy_and_line: true,
                short_description: true,
            },
            Layout::Checkbox | Layout::Auto => Self {
                copy_and_line: false,
                short_description: false,
            },
        }
    }
}

/// Complete TXF output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxfDocument {
    header: TxfRecord,
    records: Vec<TxfRecord>,
}

impl TxfDocument {
    /// Header naming the account and the generation date
    pub fn new(account: &str, generated: NaiveDate) -> Self {
        Self {
            header: TxfRecord::new()
                .field('V', TXF_VERSION)
                .field('A', account)
                .date(generated),
            records: Vec::new(),
        }
    }

    /// Append the detail record for one tax lot
    pub fn push(&mut self, lot: &TaxLot, style: TxfStyle) {
        let mut record = TxfRecord::new()
            .field('T', 'D')
            .field('N', lot.category.refnumber());
        if style.copy_and_line {
            record = record.field('C', 1).field('L', 1);
        }
        let description = if style.short_description {
            format!("{} {}", lot.quantity.normalize(), lot.symbol)
        } else {
            lot.description.clone()
        };
        record = record
            .field('P', description)
            .date(lot.acquired)
            .date(lot.sold)
            .amount(lot.basis)
            .amount(lot.proceeds);
        if let Some(wash) = lot.wash {
            record = record.amount(wash);
        }
        self.records.push(record);
    }

    /// Number of detail records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for TxfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        for record in &self.records {
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Render a whole document for `records`
pub fn render(records: &[TaxLot], account: &str, generated: NaiveDate, style: TxfStyle) -> TxfDocument {
    let mut document = TxfDocument::new(account, generated);
    for lot in records {
        document.push(lot, style);
    }
    document
}
