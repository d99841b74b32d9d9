//! Editable split proposal, kept consistent share by share.
//!
//! Editing a share's percentage recomputes its amount from the invoice total
//! and vice versa. The plan starts as an even two-way split and stays within
//! the recommended share count.

use facturier_core::DomainResult;

use crate::split::{MAX_SHARES, MIN_SHARES, SPLIT_TOLERANCE, SplitShare, validate_shares};

#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    total_ttc: f64,
    shares: Vec<SplitShare>,
}

/// Running totals of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSummary {
    pub total_percentage: f64,
    pub total_amount: f64,
    /// `total_amount - invoice total`.
    pub difference: f64,
    pub is_valid: bool,
}

impl SplitPlan {
    /// Two shares of 50% for an invoice of `total_ttc`.
    pub fn new(total_ttc: f64) -> Self {
        Self {
            total_ttc,
            shares: vec![
                SplitShare::new(50.0, total_ttc * 0.5),
                SplitShare::new(50.0, total_ttc * 0.5),
            ],
        }
    }

    pub fn total_ttc(&self) -> f64 {
        self.total_ttc
    }

    pub fn shares(&self) -> &[SplitShare] {
        &self.shares
    }

    pub fn into_shares(self) -> Vec<SplitShare> {
        self.shares
    }

    /// Add a share holding whatever percentage and amount are still
    /// unallocated (never negative). Returns `false` at the share limit.
    pub fn push_remaining(&mut self) -> bool {
        if self.shares.len() >= MAX_SHARES {
            return false;
        }
        let summary = self.summary();
        self.shares.push(SplitShare::new(
            (100.0 - summary.total_percentage).max(0.0),
            (self.total_ttc - summary.total_amount).max(0.0),
        ));
        true
    }

    /// Remove share `index`. Refused below the minimum share count.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.shares.len() <= MIN_SHARES || index >= self.shares.len() {
            return false;
        }
        self.shares.remove(index);
        true
    }

    /// Set share `index` to `percentage` and derive its amount.
    pub fn set_percentage(&mut self, index: usize, percentage: f64) -> bool {
        let total = self.total_ttc;
        match self.shares.get_mut(index) {
            Some(share) => {
                share.percentage = percentage;
                share.amount = total * percentage / 100.0;
                true
            }
            None => false,
        }
    }

    /// Set share `index` to `amount` and derive its percentage. A zero-total
    /// invoice yields a 0% share.
    pub fn set_amount(&mut self, index: usize, amount: f64) -> bool {
        let total = self.total_ttc;
        match self.shares.get_mut(index) {
            Some(share) => {
                share.amount = amount;
                share.percentage = if total == 0.0 {
                    0.0
                } else {
                    amount / total * 100.0
                };
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> SplitSummary {
        let total_percentage: f64 = self.shares.iter().map(|s| s.percentage).sum();
        let total_amount: f64 = self.shares.iter().map(|s| s.amount).sum();
        SplitSummary {
            total_percentage,
            total_amount,
            difference: total_amount - self.total_ttc,
            is_valid: (total_percentage - 100.0).abs() < SPLIT_TOLERANCE
                && (total_amount - self.total_ttc).abs() < SPLIT_TOLERANCE,
        }
    }

    /// Same checks the splitter applies before materializing.
    pub fn validate(&self) -> DomainResult<()> {
        validate_shares(self.total_ttc, &self.shares)
    }
}
