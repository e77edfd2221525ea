//! Tax lot records and the field parsers that build them

use crate::category::Category;
use crate::error::{Result, TxfError};
use crate::security::Symbol;
use crate::tokenizer::Token;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Date pattern used on statements and in TXF output
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Currency precision (cents)
pub const AMOUNT_SCALE: u32 = 2;

/// One sale of a security lot as reported on Form 1099-B
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxLot {
    /// CUSIP
    pub identifier: String,
    pub symbol: Symbol,
    /// Shares sold
    pub quantity: Decimal,
    /// Box 1a description as printed, e.g. `2 SHARES OF GOOG`
    pub description: String,
    /// Box 1b
    pub acquired: NaiveDate,
    /// Box 1c
    pub sold: NaiveDate,
    /// Box 1d
    pub proceeds: Decimal,
    /// Box 1e
    pub basis: Decimal,
    /// Box 1g, absent when there is no wash sale adjustment
    pub wash: Option<Decimal>,
    pub category: Category,
    /// Line of the identifier that opened the record
    pub line: usize,
}

impl fmt::Display for TaxLot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symbol: {} ({}), acq_date: {}, sale_date: {}, quantity: {}, proceeds: ${}, basis: ${}, wash: ${}",
            self.symbol,
            self.identifier,
            self.acquired.format(DATE_FORMAT),
            self.sold.format(DATE_FORMAT),
            self.quantity,
            self.proceeds,
            self.basis,
            self.wash.unwrap_or(Decimal::ZERO)
        )
    }
}

/// Parse a share quantity; must be strictly positive
pub fn parse_quantity(token: &Token<'_>) -> Result<Decimal> {
    let invalid = || TxfError::InvalidQuantity {
        line: token.line,
        value: token.text.to_string(),
    };
    let quantity = Decimal::from_str(token.text).map_err(|_| invalid())?;
    if quantity <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok(quantity)
}

/// Parse a currency amount such as `2,933.94` or `$1,100.22`.
///
/// Thousands separators are dropped and the value is rescaled to cents.
/// Negative values and sub-cent precision are rejected.
pub fn parse_amount(token: &Token<'_>) -> Result<Decimal> {
    let invalid = || TxfError::InvalidAmount {
        line: token.line,
        value: token.text.to_string(),
    };
    let digits: String = token
        .text
        .strip_prefix('$')
        .unwrap_or(token.text)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }
    let mut amount = Decimal::from_str(&digits).map_err(|_| invalid())?;
    if amount.scale() > AMOUNT_SCALE {
        return Err(invalid());
    }
    amount.rescale(AMOUNT_SCALE);
    Ok(amount)
}

/// Parse a `MM/DD/YYYY` date
pub fn parse_date(token: &Token<'_>) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(token.text, DATE_FORMAT).map_err(|_| TxfError::InvalidDate {
        line: token.line,
        value: token.text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tok(text: &str) -> Token<'_> {
        Token { text, line: 9 }
    }

    #[test]
    fn test_parse_amount_strips_separators() {
        assert_eq!(parse_amount(&tok("2,933.94")).unwrap(), dec!(2933.94));
        assert_eq!(parse_amount(&tok("$27,212.97")).unwrap(), dec!(27212.97));
        assert_eq!(parse_amount(&tok("0.00")).unwrap(), dec!(0.00));
    }

    #[test]
    fn test_parse_amount_rescales_to_cents() {
        let amount = parse_amount(&tok("1500")).unwrap();
        assert_eq!(amount.scale(), 2);
        assert_eq!(amount.to_string(), "1500.00");
        assert_eq!(parse_amount(&tok("730.9")).unwrap().to_string(), "730.90");
    }

    #[test]
    fn test_parse_amount_rejects_malformed() {
        for bad in ["", "$", "-5.00", "1.005", "12a.00", "X", "1.2.3"] {
            let err = parse_amount(&tok(bad)).unwrap_err();
            assert!(
                matches!(err, TxfError::InvalidAmount { line: 9, .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&tok("2")).unwrap(), dec!(2));
        assert_eq!(parse_quantity(&tok("16.5432")).unwrap(), dec!(16.5432));
        assert!(matches!(
            parse_quantity(&tok("0")),
            Err(TxfError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            parse_quantity(&tok("-3")),
            Err(TxfError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            parse_quantity(&tok("three")),
            Err(TxfError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(&tok("01/27/2020")).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 27).unwrap()
        );
        assert!(matches!(
            parse_date(&tok("2020-01-27")),
            Err(TxfError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_date(&tok("02/30/2020")),
            Err(TxfError::InvalidDate { .. })
        ));
    }
}
