//! Recursive-descent parser for 1099-B tax lot records
//!
//! A record starts at a security identifier line and continues with the
//! description, lot and sale fields:
//!
//! ```text
//! 02079K107
//! 2 SHARES OF GOOG
//! 01/27/2020 2,933.94 2,933.42 X
//! 02/06/2020 GROSS
//! ```
//!
//! Statements wrap those fields differently, so the body is matched by the
//! first [`Rule`] in [`Rule::PRIORITY`] that succeeds. Each rule runs on a
//! fork of the token stream and only a successful fork is committed.
//! Structural mismatches fall through to the next rule; bad numbers, dates
//! or identifiers abort the whole run.

use crate::category::{detect_marker, Category};
use crate::error::{Result, TxfError};
use crate::record::{parse_amount, parse_date, parse_quantity, TaxLot};
use crate::security::{self, Symbol};
use crate::tokenizer::{Line, RawText, Token, TokenStream};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Box 5 noncovered security flag
pub const NONCOVERED_FLAG: &str = "X";

/// Box 6 reported-to-IRS designator
pub const GROSS_DESIGNATOR: &str = "GROSS";

/// Statement layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Pick [`Layout::Checkbox`] when any checkbox marker is present
    #[default]
    Auto,
    /// `Box X checked` markers classify the records that follow them
    Checkbox,
    /// Records stand alone and carry no classification
    SelfContained,
}

impl Layout {
    /// Concrete layout for a document
    pub fn resolve(self, text: &RawText) -> Layout {
        match self {
            Layout::Auto => {
                if text.iter().any(|line| detect_marker(line).is_some()) {
                    Layout::Checkbox
                } else {
                    Layout::SelfContained
                }
            }
            other => other,
        }
    }

    /// Whether records are sorted by sale date unless told otherwise
    pub fn sorts_by_default(&self) -> bool {
        matches!(self, Layout::SelfContained)
    }
}

impl FromStr for Layout {
    type Err = TxfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Layout::Auto),
            "checkbox" => Ok(Layout::Checkbox),
            "self-contained" | "self_contained" => Ok(Layout::SelfContained),
            other => Err(TxfError::Config(format!(
                "unknown layout '{}' (expected auto, checkbox or self-contained)",
                other
            ))),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Auto => "auto",
            Layout::Checkbox => "checkbox",
            Layout::SelfContained => "self-contained",
        };
        write!(f, "{}", name)
    }
}

/// Line-wrapping variants of a record body, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Description and lot fields share a line, sale fields on the next
    Combined,
    /// Description, lot and sale fields each on their own line
    Split,
    /// Fields wrapped at arbitrary points
    Flowing,
}

impl Rule {
    pub const PRIORITY: [Rule; 3] = [Rule::Combined, Rule::Split, Rule::Flowing];

    fn apply(self, stream: &mut TokenStream<'_>, identifier: &str, expected: Symbol) -> Result<Body> {
        match self {
            Rule::Combined => {
                begin_line(stream)?;
                let description = description(stream, Bound::Line, identifier, expected)?;
                let lot = lot(stream, Bound::Line)?;
                stream.expect_line_end()?;
                begin_line(stream)?;
                let body = sale(stream, Bound::Line, description, lot)?;
                stream.expect_line_end()?;
                Ok(body)
            }
            Rule::Split => {
                begin_line(stream)?;
                let description = description(stream, Bound::Line, identifier, expected)?;
                stream.expect_line_end()?;
                begin_line(stream)?;
                let lot = lot(stream, Bound::Line)?;
                stream.expect_line_end()?;
                begin_line(stream)?;
                let body = sale(stream, Bound::Line, description, lot)?;
                stream.expect_line_end()?;
                Ok(body)
            }
            Rule::Flowing => {
                let description = description(stream, Bound::Stream, identifier, expected)?;
                let lot = lot(stream, Bound::Stream)?;
                let body = sale(stream, Bound::Stream, description, lot)?;
                // Trailing tokens after GROSS mean the record was misread
                stream.expect_line_end()?;
                Ok(body)
            }
        }
    }
}

/// Whether a field may continue onto the next physical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Line,
    Stream,
}

impl Bound {
    fn take<'a>(self, stream: &mut TokenStream<'a>, expected: &str) -> Result<Token<'a>> {
        match self {
            Bound::Line => stream.expect_on_line(expected),
            Bound::Stream => stream.expect_token(),
        }
    }
}

struct Description {
    quantity: Decimal,
    text: String,
}

struct Lot {
    acquired: NaiveDate,
    proceeds: Decimal,
    basis: Decimal,
    wash: Option<Decimal>,
}

struct Body {
    description: Description,
    lot: Lot,
    sold: NaiveDate,
}

fn begin_line(stream: &mut TokenStream<'_>) -> Result<()> {
    if stream.has_pending() {
        return Err(stream.error("end of line"));
    }
    match stream.start_line() {
        Some(_) => Ok(()),
        None => Err(TxfError::UnexpectedEof {
            line: stream.line_number(),
        }),
    }
}

/// Error for an optional wash slot `candidate` followed by `found` where
/// `expected` should be.
///
/// Blames `candidate` when it is not an amount, so a bad token is reported
/// on its own line even when `found` was read from the line after it.
fn misplaced(stream: &TokenStream<'_>, candidate: &Token<'_>, found: &Token<'_>, expected: &str) -> TxfError {
    let culprit = if parse_amount(candidate).is_ok() { found } else { candidate };
    stream.error_at(culprit, expected)
}

/// `<quantity> SHARES OF <symbol>`
fn description(
    stream: &mut TokenStream<'_>,
    bound: Bound,
    identifier: &str,
    expected: Symbol,
) -> Result<Description> {
    let quantity_token = bound.take(stream, "share quantity")?;
    let quantity = parse_quantity(&quantity_token)?;

    let shares = bound.take(stream, "SHARES")?;
    if shares.text != "SHARES" && shares.text != "SHARE" {
        return Err(stream.error_at(&shares, "SHARES"));
    }
    let of = bound.take(stream, "OF")?;
    if of.text != "OF" {
        return Err(stream.error_at(&of, "OF"));
    }

    let symbol_token = bound.take(stream, "symbol")?;
    let symbol = Symbol::from_str(symbol_token.text).map_err(|_| TxfError::UnknownSymbol {
        line: symbol_token.line,
        symbol: symbol_token.text.to_string(),
    })?;
    if symbol != expected {
        return Err(TxfError::SymbolMismatch {
            line: symbol_token.line,
            identifier: identifier.to_string(),
            symbol: symbol.to_string(),
        });
    }

    Ok(Description {
        quantity,
        text: format!("{} {} OF {}", quantity_token.text, shares.text, symbol),
    })
}

/// `<acquired> <proceeds> <basis> [<wash>] X`
fn lot(stream: &mut TokenStream<'_>, bound: Bound) -> Result<Lot> {
    let acquired = parse_date(&bound.take(stream, "acquisition date")?)?;
    let proceeds = parse_amount(&bound.take(stream, "proceeds")?)?;
    let basis = parse_amount(&bound.take(stream, "cost basis")?)?;

    let next = bound.take(stream, "noncovered flag")?;
    let wash = if next.text == NONCOVERED_FLAG {
        None
    } else {
        // Not the flag, so it must be a wash amount followed by the flag
        let flag = bound.take(stream, "noncovered flag")?;
        if flag.text != NONCOVERED_FLAG {
            return Err(misplaced(stream, &next, &flag, "noncovered flag X"));
        }
        Some(parse_amount(&next)?)
    };

    Ok(Lot {
        acquired,
        proceeds,
        basis,
        wash,
    })
}

/// `<sold> [<wash>] GROSS`
fn sale(stream: &mut TokenStream<'_>, bound: Bound, description: Description, mut lot: Lot) -> Result<Body> {
    let sold = parse_date(&bound.take(stream, "sale date")?)?;

    let next = bound.take(stream, GROSS_DESIGNATOR)?;
    if next.text != GROSS_DESIGNATOR {
        // A second wash amount is rejected rather than replacing the one
        // already read before the noncovered flag
        if lot.wash.is_some() {
            return Err(stream.error_at(&next, GROSS_DESIGNATOR));
        }
        let designator = bound.take(stream, GROSS_DESIGNATOR)?;
        if designator.text != GROSS_DESIGNATOR {
            return Err(misplaced(stream, &next, &designator, GROSS_DESIGNATOR));
        }
        lot.wash = Some(parse_amount(&next)?);
    }

    Ok(Body {
        description,
        lot,
        sold,
    })
}

/// Parse one record whose identifier line has just been consumed.
///
/// Tries each [`Rule`] in priority order on a fork of `stream`. When none
/// match, the structural error that reached furthest into the input wins.
pub fn parse_record(stream: &mut TokenStream<'_>, identifier: Line<'_>, category: Category) -> Result<TaxLot> {
    let symbol = security::lookup(identifier.text).ok_or_else(|| TxfError::UnknownIdentifier {
        line: identifier.number,
        identifier: identifier.text.to_string(),
    })?;

    let mut furthest: Option<TxfError> = None;
    for rule in Rule::PRIORITY {
        let mut fork = stream.fork();
        match rule.apply(&mut fork, identifier.text, symbol) {
            Ok(body) => {
                stream.commit(fork);
                let record = TaxLot {
                    identifier: identifier.text.to_string(),
                    symbol,
                    quantity: body.description.quantity,
                    description: body.description.text,
                    acquired: body.lot.acquired,
                    sold: body.sold,
                    proceeds: body.lot.proceeds,
                    basis: body.lot.basis,
                    wash: body.lot.wash,
                    category,
                    line: identifier.number,
                };
                log::info!("Read record ({:?} layout): {}", rule, record);
                return Ok(record);
            }
            Err(e) if e.is_structural() => {
                log::debug!("{:?} layout rejected record at line {}: {}", rule, identifier.number, e);
                // Strictly further only: on a tie the earlier rule's error stands
                let further = furthest
                    .as_ref()
                    .map_or(true, |best| e.line().unwrap_or(0) > best.line().unwrap_or(0));
                if further {
                    furthest = Some(e);
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(furthest.unwrap_or_else(|| stream.error("tax lot record")))
}

/// Record-at-a-time parser that threads the current checkbox classification
pub struct RecordParser<'a> {
    stream: TokenStream<'a>,
    layout: Layout,
}

impl<'a> RecordParser<'a> {
    /// [`Layout::Auto`] is resolved against `text` up front
    pub fn new(text: &'a RawText, layout: Layout) -> Self {
        Self {
            stream: text.stream(),
            layout: layout.resolve(text),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Parse the next record under classification `current`.
    ///
    /// Returns the record together with the classification in force after
    /// it, or `None` at end of input.
    pub fn next_record(&mut self, current: Option<Category>) -> Result<Option<(TaxLot, Option<Category>)>> {
        let mut current = current;
        loop {
            let line = match self.layout {
                Layout::Checkbox => self
                    .stream
                    .scan_until(|l| security::is_candidate(l) || detect_marker(l).is_some()),
                _ => self.stream.find_identifier(),
            };
            let Some(line) = line else {
                return Ok(None);
            };

            if self.layout == Layout::Checkbox {
                if let Some(marker) = detect_marker(line.text) {
                    if current.is_some_and(|c| c != marker) {
                        log::warn!("Line {}: classification changes to {}", line.number, marker);
                    }
                    current = Some(marker);
                    continue;
                }
            }

            let category = match self.layout {
                Layout::Checkbox => current.ok_or_else(|| TxfError::MissingCategory {
                    line: line.number,
                    content: line.text.to_string(),
                })?,
                _ => Category::Unclassified,
            };

            let record = parse_record(&mut self.stream, line, category)?;
            return Ok(Some((record, current)));
        }
    }
}

/// Parse every record in the document; the first failure aborts the run
pub fn parse_records(text: &RawText, layout: Layout) -> Result<Vec<TaxLot>> {
    let mut parser = RecordParser::new(text, layout);
    let mut current = None;
    let mut records = Vec::new();

    while let Some((record, category)) = parser.next_record(current)? {
        records.push(record);
        current = category;
    }

    log::info!(
        "Parsed {} records from {} lines ({} layout)",
        records.len(),
        text.len(),
        parser.layout()
    );
    Ok(records)
}
