use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    CommissionRecord, Deal, MilestoneBonus, MonthlyBonus, NewCommissionRecord, NewDeal,
    NewMilestoneBonus, NewMonthlyBonus, NewQuote, NewSalesRep, Quote, SalesRep,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for reps, deals and everything accrued against them.
///
/// Writes that must happen at most once (commission lines, monthly and
/// milestone bonuses) are insert-or-ignore against a unique key, so callers
/// can retry a sync without checking first.
#[async_trait]
pub trait PortalRepository: Send + Sync {
    // Sales reps
    /// Inserts the rep or updates the name of the existing rep with that email.
    async fn upsert_sales_rep(&self, rep: NewSalesRep) -> Result<SalesRep, RepositoryError>;
    async fn get_sales_rep(&self, id: i64) -> Result<SalesRep, RepositoryError>;
    async fn get_sales_rep_by_email(&self, email: &str) -> Result<SalesRep, RepositoryError>;
    async fn list_sales_reps(&self) -> Result<Vec<SalesRep>, RepositoryError>;

    // Deals
    /// Keyed on `crm_deal_id`; a re-synced deal keeps its id.
    async fn upsert_deal(&self, deal: NewDeal) -> Result<Deal, RepositoryError>;
    async fn get_deal(&self, id: i64) -> Result<Deal, RepositoryError>;
    async fn list_deals_for_rep(&self, sales_rep_id: i64) -> Result<Vec<Deal>, RepositoryError>;

    // Commissions
    async fn has_commission_records(&self, deal_id: i64) -> Result<bool, RepositoryError>;

    /// Returns how many of `records` were newly written.
    async fn insert_commission_records(
        &self,
        records: &[NewCommissionRecord],
    ) -> Result<usize, RepositoryError>;

    async fn list_commissions_for_deal(
        &self,
        deal_id: i64,
    ) -> Result<Vec<CommissionRecord>, RepositoryError>;

    async fn list_commissions_for_rep(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<CommissionRecord>, RepositoryError>;

    // Bonuses
    /// Keeps one bonus per rep and month, replacing it only with a larger
    /// award. `true` if the bonus was written or upgraded.
    async fn award_monthly_bonus(&self, bonus: NewMonthlyBonus) -> Result<bool, RepositoryError>;

    async fn list_monthly_bonuses(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<MonthlyBonus>, RepositoryError>;

    /// `true` if the milestone was written, `false` if it was already held.
    async fn award_milestone_bonus(
        &self,
        bonus: NewMilestoneBonus,
    ) -> Result<bool, RepositoryError>;

    async fn list_milestone_bonuses(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<MilestoneBonus>, RepositoryError>;

    // Aggregates
    /// Deals the rep closed in the calendar month containing `month`.
    async fn count_clients_closed_in_month(
        &self,
        sales_rep_id: i64,
        month: NaiveDate,
    ) -> Result<u32, RepositoryError>;

    async fn count_clients_closed_total(&self, sales_rep_id: i64) -> Result<u32, RepositoryError>;

    // Quotes
    async fn create_quote(&self, quote: NewQuote) -> Result<Quote, RepositoryError>;
    async fn get_quote(&self, id: i64) -> Result<Quote, RepositoryError>;
    async fn list_quotes(&self, contact_email: Option<&str>) -> Result<Vec<Quote>, RepositoryError>;
}
