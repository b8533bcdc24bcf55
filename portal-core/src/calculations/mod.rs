//! Pricing and compensation rules.
//!
//! Everything here is synchronous and free of I/O. Persistence of the
//! resulting records is left to [`crate::db::PortalRepository`].

pub mod bonuses;
pub mod commissions;
pub mod common;
pub mod pricing;

pub use bonuses::{
    MilestoneAward, MilestoneProgress, MonthlyBonusAward, calculate_milestone_bonus,
    calculate_monthly_bonus,
};
pub use commissions::{
    CommissionCalculation, CommissionConfig, CommissionConfigError, CommissionSchedule,
    ResidualCommission, calculate_commissions, generate_commission_records,
};
pub use pricing::{calculate_bookkeeping_fees, calculate_combined_fees, calculate_taas_fees};
