use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monthly and one-time fees for a single service line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResult {
    pub monthly_fee: Decimal,
    pub setup_fee: Decimal,
}

impl FeeResult {
    pub const ZERO: FeeResult = FeeResult {
        monthly_fee: Decimal::ZERO,
        setup_fee: Decimal::ZERO,
    };

    pub fn new(
        monthly_fee: Decimal,
        setup_fee: Decimal,
    ) -> Self {
        Self {
            monthly_fee,
            setup_fee,
        }
    }
}

impl Add for FeeResult {
    type Output = FeeResult;

    fn add(
        self,
        rhs: FeeResult,
    ) -> FeeResult {
        FeeResult {
            monthly_fee: self.monthly_fee + rhs.monthly_fee,
            setup_fee: self.setup_fee + rhs.setup_fee,
        }
    }
}

/// Intake question whose answer is required before a line can be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PricingField {
    RevenueBand,
    MonthlyTransactions,
    Industry,
    CleanupMonths,
    CleanupComplexity,
    EntityType,
    NumEntities,
    StatesFiled,
    InternationalFiling,
    NumBusinessOwners,
    BookkeepingQuality,
    #[serde(rename = "include1040s")]
    Include1040s,
    PriorYearsUnfiled,
    AlreadyOnSeedBookkeeping,
}

/// Outcome of pricing one service line.
///
/// `Incomplete` keeps "the form is not finished" apart from a line that
/// legitimately prices at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FeeQuote {
    Complete(FeeResult),
    Incomplete { missing: Vec<PricingField> },
    NotIncluded,
}

impl FeeQuote {
    /// Fees to bill for this line; zero unless the quote is complete.
    pub fn fees(&self) -> FeeResult {
        match self {
            Self::Complete(fees) => *fees,
            Self::Incomplete { .. } | Self::NotIncluded => FeeResult::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedFeeResult {
    pub bookkeeping: FeeQuote,
    pub taas: FeeQuote,
    pub combined: FeeResult,
    pub includes_bookkeeping: bool,
    pub includes_taas: bool,
}

impl CombinedFeeResult {
    /// Builds the combined view; `combined` is always the sum of both lines.
    pub fn new(
        bookkeeping: FeeQuote,
        taas: FeeQuote,
        includes_bookkeeping: bool,
        includes_taas: bool,
    ) -> Self {
        let combined = bookkeeping.fees() + taas.fees();
        Self {
            bookkeeping,
            taas,
            combined,
            includes_bookkeeping,
            includes_taas,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn incomplete_and_not_included_bill_nothing() {
        let incomplete = FeeQuote::Incomplete {
            missing: vec![PricingField::Industry],
        };

        assert_eq!(incomplete.fees(), FeeResult::ZERO);
        assert_eq!(FeeQuote::NotIncluded.fees(), FeeResult::ZERO);
    }

    #[test]
    fn combined_sums_both_lines() {
        let result = CombinedFeeResult::new(
            FeeQuote::Complete(FeeResult::new(dec!(430), dec!(975))),
            FeeQuote::Complete(FeeResult::new(dec!(525), dec!(4200))),
            true,
            true,
        );

        assert_eq!(result.combined, FeeResult::new(dec!(955), dec!(5175)));
    }

    #[test]
    fn serializes_quote_status_tag() {
        let quote = FeeQuote::Incomplete {
            missing: vec![PricingField::CleanupComplexity, PricingField::Include1040s],
        };

        let json = serde_json::to_value(&quote).expect("serializable");

        assert_eq!(
            json,
            serde_json::json!({
                "status": "incomplete",
                "missing": ["cleanupComplexity", "include1040s"]
            })
        );
    }
}
