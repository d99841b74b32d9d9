use serde::{Deserialize, Serialize};

use facturier_core::LineItemId;

/// How a line's `discount` value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiscountType {
    /// `discount` is a percentage of the line's gross amount.
    #[default]
    #[serde(rename = "percentage")]
    Percentage,
    /// `discount` is a literal currency amount subtracted from the line.
    #[serde(rename = "fixedAmount", alias = "amount")]
    FixedAmount,
}

/// A single billed line.
///
/// `unit_price` may be negative for credit lines; `quantity` may be
/// fractional. The derived amounts are never rounded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub designation: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// VAT rate in percent (e.g. `20.0`).
    pub vat_rate: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub discount_type: DiscountType,
}

impl LineItem {
    /// Default VAT rate of a freshly added line.
    pub const DEFAULT_VAT_RATE: f64 = 20.0;

    /// A new, empty line: quantity 1, price 0, default VAT, no discount.
    pub fn blank(id: LineItemId) -> Self {
        Self {
            id,
            designation: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
            vat_rate: Self::DEFAULT_VAT_RATE,
            discount: 0.0,
            discount_type: DiscountType::Percentage,
        }
    }

    pub fn new(
        id: LineItemId,
        designation: impl Into<String>,
        quantity: f64,
        unit_price: f64,
        vat_rate: f64,
    ) -> Self {
        Self {
            id,
            designation: designation.into(),
            quantity,
            unit_price,
            vat_rate,
            discount: 0.0,
            discount_type: DiscountType::Percentage,
        }
    }

    pub fn with_discount(mut self, discount: f64, discount_type: DiscountType) -> Self {
        self.discount = discount;
        self.discount_type = discount_type;
        self
    }

    /// `quantity × unit_price`.
    pub fn gross(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Effective discount. A fixed amount is not clamped to the gross amount.
    pub fn discount_amount(&self) -> f64 {
        match self.discount_type {
            DiscountType::Percentage => self.gross() * self.discount / 100.0,
            DiscountType::FixedAmount => self.discount,
        }
    }

    /// Tax-exclusive line total (HT).
    pub fn net(&self) -> f64 {
        self.gross() - self.discount_amount()
    }

    /// VAT due on the line.
    pub fn vat(&self) -> f64 {
        self.net() * self.vat_rate / 100.0
    }

    /// Whether the line carries a usable designation.
    pub fn has_designation(&self) -> bool {
        !self.designation.trim().is_empty()
    }

    /// Copy of this line with its quantity multiplied by `factor`.
    ///
    /// Price, VAT rate and discount are copied unchanged, so a fixed-amount
    /// discount is *not* scaled.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            quantity: self.quantity * factor,
            ..self.clone()
        }
    }
}
