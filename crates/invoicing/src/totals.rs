//! Money/tax calculator.

use serde::{Deserialize, Serialize};

use crate::line_item::LineItem;

/// Aggregate document totals. Stored unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    #[serde(rename = "totalHT")]
    pub total_ht: f64,
    #[serde(rename = "totalVAT")]
    pub total_vat: f64,
    #[serde(rename = "totalTTC")]
    pub total_ttc: f64,
}

impl Totals {
    pub const ZERO: Totals = Totals {
        total_ht: 0.0,
        total_vat: 0.0,
        total_ttc: 0.0,
    };
}

/// Compute `{totalHT, totalVAT, totalTTC}` for an ordered list of lines.
///
/// `totalTTC` is always `totalHT + totalVAT`. An empty list yields zeros.
pub fn calculate_totals(items: &[LineItem]) -> Totals {
    let (total_ht, total_vat) = items
        .iter()
        .fold((0.0, 0.0), |(ht, vat), item| (ht + item.net(), vat + item.vat()));

    Totals {
        total_ht,
        total_vat,
        total_ttc: total_ht + total_vat,
    }
}
