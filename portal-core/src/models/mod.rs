mod bonus;
mod commission_record;
mod deal;
mod fee_result;
mod pricing_input;
mod quote;

pub use bonus::{
    MilestoneBonus, MilestoneTier, MonthlyBonus, MonthlyBonusTier, NewMilestoneBonus,
    NewMonthlyBonus,
};
pub use commission_record::{CommissionRecord, CommissionType, NewCommissionRecord};
pub use deal::{Deal, NewDeal, NewSalesRep, SalesRep};
pub use fee_result::{CombinedFeeResult, FeeQuote, FeeResult, PricingField};
pub use pricing_input::{
    BookkeepingQuality, EntityType, Industry, OverrideReason, PricingInput, RevenueBand,
    TransactionBand,
};
pub use quote::{NewQuote, Quote};
