//! Turns closed deals into commission ledger entries and bonus awards.
//!
//! Syncing is safe to repeat: commission lines and milestones are
//! insert-or-ignore in the repository, and a rep's monthly bonus is only
//! ever replaced by a higher tier.

use chrono::{Datelike, NaiveDate};
use portal_core::calculations::{
    CommissionSchedule, calculate_milestone_bonus, calculate_monthly_bonus,
};
use portal_core::{
    MilestoneTier, MonthlyBonusTier, NewMilestoneBonus, NewMonthlyBonus, PortalRepository,
    RepositoryError, SalesRep,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::loader::DealRecord;

/// What a single deal sync changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealSync {
    pub deal_id: i64,
    pub sales_rep_id: i64,
    pub commission_records_created: usize,
    /// Zero when the deal's schedule was already recorded.
    pub commission_scheduled: Decimal,
    /// Set when this sync awarded the month's first bonus or raised its tier.
    pub monthly_bonus: Option<MonthlyBonusTier>,
    pub milestones: Vec<MilestoneTier>,
}

/// Totals for a batch of deal syncs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccrualSummary {
    pub deals_synced: usize,
    pub commission_records_created: usize,
    /// Year-one commission scheduled by this batch; deals that already had
    /// records are not counted again.
    pub commission_scheduled: Decimal,
    pub monthly_bonuses_awarded: usize,
    pub milestone_bonuses_awarded: usize,
}

/// Commission and bonus accrual over any [`PortalRepository`].
pub struct CommissionAccrual<'a, R: PortalRepository + ?Sized> {
    repo: &'a R,
    schedule: CommissionSchedule,
}

impl<'a, R: PortalRepository + ?Sized> CommissionAccrual<'a, R> {
    /// Accrual at the standard commission rates.
    pub fn new(repo: &'a R) -> Self {
        Self::with_schedule(repo, CommissionSchedule::default())
    }

    pub fn with_schedule(
        repo: &'a R,
        schedule: CommissionSchedule,
    ) -> Self {
        Self { repo, schedule }
    }

    /// Upserts the record's rep and deal, writes the deal's commission
    /// schedule if it has none yet, then awards any bonus the rep now
    /// qualifies for.
    pub async fn sync_deal(
        &self,
        record: &DealRecord,
    ) -> Result<DealSync, RepositoryError> {
        let rep = self.repo.upsert_sales_rep(record.sales_rep()).await?;
        let deal = self.repo.upsert_deal(record.to_new_deal(rep.id)).await?;

        let (commission_records_created, commission_scheduled) =
            if self.repo.has_commission_records(deal.id).await? {
                debug!(crm_deal_id = %deal.crm_deal_id, "commissions already recorded");
                (0, Decimal::ZERO)
            } else {
                let calculation = self.schedule.calculate(&deal, deal.first_payment_date);
                let records = self.schedule.records(&deal, &calculation);
                let created = self.repo.insert_commission_records(&records).await?;
                info!(
                    crm_deal_id = %deal.crm_deal_id,
                    records = created,
                    total_year1 = %calculation.total_commission_year1,
                    "commission schedule recorded"
                );
                (created, calculation.total_commission_year1)
            };

        let monthly_bonus = self.award_monthly_bonus(&rep, deal.closed_date).await?;
        let milestones = self.award_milestones(&rep).await?;

        Ok(DealSync {
            deal_id: deal.id,
            sales_rep_id: rep.id,
            commission_records_created,
            commission_scheduled,
            monthly_bonus,
            milestones,
        })
    }

    /// Syncs every record in order and totals the results.
    ///
    /// Stops at the first repository error; deals synced before it stay
    /// written.
    pub async fn sync_deals(
        &self,
        records: &[DealRecord],
    ) -> Result<AccrualSummary, RepositoryError> {
        let mut summary = AccrualSummary::default();

        for record in records {
            let sync = self.sync_deal(record).await?;
            summary.deals_synced += 1;
            summary.commission_records_created += sync.commission_records_created;
            summary.commission_scheduled += sync.commission_scheduled;
            summary.monthly_bonuses_awarded += usize::from(sync.monthly_bonus.is_some());
            summary.milestone_bonuses_awarded += sync.milestones.len();
        }

        Ok(summary)
    }

    async fn award_monthly_bonus(
        &self,
        rep: &SalesRep,
        closed_date: NaiveDate,
    ) -> Result<Option<MonthlyBonusTier>, RepositoryError> {
        let clients_closed = self
            .repo
            .count_clients_closed_in_month(rep.id, closed_date)
            .await?;
        let Some(award) = calculate_monthly_bonus(clients_closed) else {
            return Ok(None);
        };

        let bonus_month = closed_date.with_day(1).unwrap_or(closed_date);
        let awarded = self
            .repo
            .award_monthly_bonus(NewMonthlyBonus {
                sales_rep_id: rep.id,
                bonus_month,
                tier: award.tier,
                amount: award.amount,
                reward_description: award.reward_description,
                clients_closed,
            })
            .await?;

        if !awarded {
            return Ok(None);
        }
        info!(
            sales_rep = %rep.email,
            month = %bonus_month.format("%Y-%m"),
            tier = award.tier.as_str(),
            amount = %award.amount,
            "monthly bonus awarded"
        );
        Ok(Some(award.tier))
    }

    async fn award_milestones(
        &self,
        rep: &SalesRep,
    ) -> Result<Vec<MilestoneTier>, RepositoryError> {
        let total = self.repo.count_clients_closed_total(rep.id).await?;
        let progress = calculate_milestone_bonus(total);
        let mut newly_awarded = Vec::new();

        for award in progress.achieved {
            let awarded = self
                .repo
                .award_milestone_bonus(NewMilestoneBonus {
                    sales_rep_id: rep.id,
                    tier: award.tier,
                    amount: award.amount,
                    equity_offer: award.equity_offer,
                    clients_closed: total,
                })
                .await?;
            if awarded {
                info!(
                    sales_rep = %rep.email,
                    milestone = award.tier.as_str(),
                    amount = %award.amount,
                    equity_offer = award.equity_offer,
                    "milestone bonus awarded"
                );
                newly_awarded.push(award.tier);
            }
        }

        Ok(newly_awarded)
    }
}
