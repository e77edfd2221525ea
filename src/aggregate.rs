//! Running totals per classification, for checking against the statement

use crate::category::Category;
use crate::record::{TaxLot, AMOUNT_SCALE};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Summed amounts for one classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub proceeds: Decimal,
    pub basis: Decimal,
    pub wash: Decimal,
    pub records: usize,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            proceeds: Decimal::new(0, AMOUNT_SCALE),
            basis: Decimal::new(0, AMOUNT_SCALE),
            wash: Decimal::new(0, AMOUNT_SCALE),
            records: 0,
        }
    }
}

impl Totals {
    fn add(&mut self, record: &TaxLot) {
        self.proceeds += record.proceeds;
        self.basis += record.basis;
        if let Some(wash) = record.wash {
            self.wash += wash;
        }
        self.records += 1;
    }
}

/// Totals keyed by classification; only ever grows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TotalsAccumulator {
    totals: BTreeMap<Category, Totals>,
}

impl TotalsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one accepted record into its category
    pub fn record(&mut self, record: &TaxLot) {
        self.totals.entry(record.category).or_default().add(record);
    }

    pub fn get(&self, category: Category) -> Option<&Totals> {
        self.totals.get(&category)
    }

    /// Categories in refnumber order
    pub fn iter(&self) -> impl Iterator<Item = (&Category, &Totals)> {
        self.totals.iter()
    }

    /// Sum over every category
    pub fn grand_total(&self) -> Totals {
        self.totals.values().fold(Totals::default(), |mut acc, t| {
            acc.proceeds += t.proceeds;
            acc.basis += t.basis;
            acc.wash += t.wash;
            acc.records += t.records;
            acc
        })
    }
}

/// Verification report printed after a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub totals: TotalsAccumulator,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Verify these totals match those at the end of your brokerage statement:"
        )?;
        for (category, totals) in self.totals.iter() {
            writeln!(f, "  Category: {} ({} records)", category, totals.records)?;
            writeln!(
                f,
                "    Total Proceeds (Box 1d):                     ${:.2}",
                totals.proceeds
            )?;
            writeln!(
                f,
                "    Total Cost or Other Basis (Box 1e):          ${:.2}",
                totals.basis
            )?;
            writeln!(
                f,
                "    Total Wash Sale Losses Disallowed (Box 1g):  ${:.2}",
                totals.wash
            )?;
        }
        Ok(())
    }
}

/// Sort (optionally) and total a parsed record list.
///
/// Sorting is by sale date and stable, so lots sold on the same day keep
/// their statement order.
pub fn aggregate(records: &mut [TaxLot], sort_by_sale_date: bool) -> Summary {
    if sort_by_sale_date {
        records.sort_by_key(|r| r.sold);
    }

    let mut totals = TotalsAccumulator::new();
    for record in records.iter() {
        totals.record(record);
    }

    let grand = totals.grand_total();
    log::info!(
        "{} records: Total Proceeds: ${:.2}, Total Basis: ${:.2}, Total Wash: ${:.2}",
        grand.records,
        grand.proceeds,
        grand.basis,
        grand.wash
    );

    Summary { totals }
}
