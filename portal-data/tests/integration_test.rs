//! Integration tests for deal loading and accrual against the SQLite backend.

use chrono::NaiveDate;
use portal_core::{CommissionType, MilestoneTier, MonthlyBonusTier, PortalRepository};
use portal_data::{CommissionAccrual, DealLoader, DealRecord};
use portal_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const CLOSED_DEALS_CSV: &str = include_str!("../test-data/closed_deals.csv");

async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

fn date(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

fn closed_deals() -> Vec<DealRecord> {
    let records = DealLoader::parse(CLOSED_DEALS_CSV.as_bytes()).expect("Failed to parse CSV");
    DealLoader::validate(&records).expect("Fixture should validate");
    records
}

fn lee_deal(
    i: u32,
    closed_date: NaiveDate,
) -> DealRecord {
    DealRecord {
        crm_deal_id: format!("hs-9{i:03}"),
        company_name: format!("Client {i}"),
        sales_rep_email: "lee@example.com".to_string(),
        sales_rep_name: "Lee Park".to_string(),
        monthly_value: dec!(100),
        setup_fee: None,
        closed_date,
        first_payment_date: None,
    }
}

/// Five deals a month for five months, all for one rep.
fn busy_rep_deals() -> Vec<DealRecord> {
    (0..25u32)
        .map(|i| lee_deal(i, date(2024, 1 + i / 5, 1 + i % 5)))
        .collect()
}

#[tokio::test]
async fn test_sync_closed_deals_export() {
    let repo = setup_test_db().await;
    let records = closed_deals();
    assert_eq!(records.len(), 8);

    let summary = CommissionAccrual::new(&repo)
        .sync_deals(&records)
        .await
        .expect("Failed to sync deals");

    assert_eq!(summary.deals_synced, 8);
    // Three deals have no setup fee, so they skip the setup line.
    assert_eq!(summary.commission_records_created, 101);
    assert_eq!(summary.commission_scheduled, dec!(12095));
    assert_eq!(summary.monthly_bonuses_awarded, 1);
    assert_eq!(summary.milestone_bonuses_awarded, 0);
}

#[tokio::test]
async fn test_rep_email_case_maps_to_one_rep() {
    let repo = setup_test_db().await;
    CommissionAccrual::new(&repo)
        .sync_deals(&closed_deals())
        .await
        .expect("Failed to sync deals");

    let reps = repo.list_sales_reps().await.expect("Failed to list reps");
    let emails: Vec<&str> = reps.iter().map(|rep| rep.email.as_str()).collect();
    assert_eq!(emails.len(), 2);
    assert!(emails.contains(&"dana@example.com"));
    assert!(emails.contains(&"sam@example.com"));

    let dana = repo
        .get_sales_rep_by_email("dana@example.com")
        .await
        .expect("Dana should exist");
    let deals = repo
        .list_deals_for_rep(dana.id)
        .await
        .expect("Failed to list deals");
    assert_eq!(deals.len(), 6);
}

#[tokio::test]
async fn test_commission_schedule_is_persisted() {
    let repo = setup_test_db().await;
    let accrual = CommissionAccrual::new(&repo);
    let records = closed_deals();

    let sync = accrual
        .sync_deal(&records[0])
        .await
        .expect("Failed to sync deal");
    assert_eq!(sync.commission_records_created, 13);
    assert_eq!(sync.commission_scheduled, dec!(1900));
    assert_eq!(sync.monthly_bonus, None);

    let commissions = repo
        .list_commissions_for_deal(sync.deal_id)
        .await
        .expect("Failed to list commissions");
    assert_eq!(commissions.len(), 13);

    let initial = &commissions[0];
    assert_eq!(initial.month_number, 1);
    assert_eq!(initial.amount, dec!(400));
    assert_eq!(initial.payment_month, date(2024, 1, 1));

    let setup = commissions
        .iter()
        .find(|c| c.commission_type == CommissionType::SetupFee)
        .expect("Setup fee commission");
    assert_eq!(setup.base_amount, dec!(2000));
    assert_eq!(setup.amount, dec!(400));

    let residuals: Vec<_> = commissions
        .iter()
        .filter(|c| c.commission_type == CommissionType::Residual)
        .collect();
    assert_eq!(residuals.len(), 11);
    assert!(residuals.iter().all(|c| c.amount == dec!(100)));
    assert_eq!(residuals[0].month_number, 2);
    assert_eq!(residuals[0].payment_month, date(2024, 2, 1));
    assert_eq!(residuals[10].month_number, 12);
    assert_eq!(residuals[10].payment_month, date(2024, 12, 1));

    let total: Decimal = commissions.iter().map(|c| c.amount).sum();
    assert_eq!(total, dec!(1900));
}

#[tokio::test]
async fn test_monthly_bonus_awarded_on_fifth_close() {
    let repo = setup_test_db().await;
    let accrual = CommissionAccrual::new(&repo);

    let mut fifth = None;
    for record in closed_deals() {
        let sync = accrual.sync_deal(&record).await.expect("Failed to sync deal");
        if record.crm_deal_id == "hs-1005" {
            fifth = Some(sync);
        }
    }

    let fifth = fifth.expect("hs-1005 is in the export");
    assert_eq!(fifth.monthly_bonus, Some(MonthlyBonusTier::FiveClients));

    let bonuses = repo
        .list_monthly_bonuses(fifth.sales_rep_id)
        .await
        .expect("Failed to list bonuses");
    assert_eq!(bonuses.len(), 1);
    assert_eq!(bonuses[0].bonus_month, date(2024, 1, 1));
    assert_eq!(bonuses[0].amount, dec!(500));
    assert_eq!(bonuses[0].clients_closed, 5);
    assert_eq!(bonuses[0].reward_description, "$500 cash bonus");

    let january = repo
        .count_clients_closed_in_month(fifth.sales_rep_id, date(2024, 1, 17))
        .await
        .expect("Failed to count");
    let february = repo
        .count_clients_closed_in_month(fifth.sales_rep_id, date(2024, 2, 1))
        .await
        .expect("Failed to count");
    assert_eq!((january, february), (5, 1));
}

#[tokio::test]
async fn test_resync_is_idempotent() {
    let repo = setup_test_db().await;
    let accrual = CommissionAccrual::new(&repo);
    let records = closed_deals();

    accrual.sync_deals(&records).await.expect("First sync failed");
    let again = accrual.sync_deals(&records).await.expect("Second sync failed");

    assert_eq!(again.deals_synced, 8);
    assert_eq!(again.commission_records_created, 0);
    assert_eq!(again.commission_scheduled, dec!(0));
    assert_eq!(again.monthly_bonuses_awarded, 0);
    assert_eq!(again.milestone_bonuses_awarded, 0);

    let dana = repo
        .get_sales_rep_by_email("dana@example.com")
        .await
        .expect("Dana should exist");
    let commissions = repo
        .list_commissions_for_rep(dana.id)
        .await
        .expect("Failed to list commissions");
    assert_eq!(commissions.len(), 76);
}

#[tokio::test]
async fn test_updated_deal_keeps_original_schedule() {
    let repo = setup_test_db().await;
    let accrual = CommissionAccrual::new(&repo);
    let mut record = closed_deals().remove(0);

    let first = accrual.sync_deal(&record).await.expect("Failed to sync deal");

    record.monthly_value = dec!(1500);
    let second = accrual.sync_deal(&record).await.expect("Failed to re-sync deal");

    assert_eq!(second.deal_id, first.deal_id);
    assert_eq!(second.commission_records_created, 0);

    let deal = repo.get_deal(first.deal_id).await.expect("Deal should exist");
    assert_eq!(deal.monthly_value, dec!(1500));

    let commissions = repo
        .list_commissions_for_deal(first.deal_id)
        .await
        .expect("Failed to list commissions");
    assert_eq!(commissions.len(), 13);
    assert_eq!(commissions[0].amount, dec!(400));
}

#[tokio::test]
async fn test_milestone_awarded_at_twenty_five_clients() {
    let repo = setup_test_db().await;

    let summary = CommissionAccrual::new(&repo)
        .sync_deals(&busy_rep_deals())
        .await
        .expect("Failed to sync deals");

    assert_eq!(summary.deals_synced, 25);
    assert_eq!(summary.commission_records_created, 25 * 12);
    assert_eq!(summary.monthly_bonuses_awarded, 5);
    assert_eq!(summary.milestone_bonuses_awarded, 1);

    let lee = repo
        .get_sales_rep_by_email("lee@example.com")
        .await
        .expect("Lee should exist");
    assert_eq!(
        repo.count_clients_closed_total(lee.id).await.expect("Failed to count"),
        25
    );

    let milestones = repo
        .list_milestone_bonuses(lee.id)
        .await
        .expect("Failed to list milestones");
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0].tier, MilestoneTier::Clients25);
    assert_eq!(milestones[0].amount, dec!(1000));
    assert!(!milestones[0].equity_offer);
    assert_eq!(milestones[0].clients_closed, 25);
}

#[tokio::test]
async fn test_twenty_fifth_close_reports_milestone() {
    let repo = setup_test_db().await;
    let accrual = CommissionAccrual::new(&repo);
    let deals = busy_rep_deals();

    accrual
        .sync_deals(&deals[..24])
        .await
        .expect("Failed to sync deals");
    let last = accrual.sync_deal(&deals[24]).await.expect("Failed to sync deal");

    assert_eq!(last.milestones, vec![MilestoneTier::Clients25]);
    assert_eq!(last.monthly_bonus, Some(MonthlyBonusTier::FiveClients));
}

#[tokio::test]
async fn test_monthly_bonus_climbs_to_highest_tier() {
    let repo = setup_test_db().await;
    let accrual = CommissionAccrual::new(&repo);

    let mut awarded = Vec::new();
    for i in 0..15u32 {
        let sync = accrual
            .sync_deal(&lee_deal(i, date(2024, 3, 1 + i)))
            .await
            .expect("Failed to sync deal");
        if let Some(tier) = sync.monthly_bonus {
            awarded.push((i + 1, tier));
        }
    }

    assert_eq!(
        awarded,
        vec![
            (5, MonthlyBonusTier::FiveClients),
            (10, MonthlyBonusTier::TenClients),
            (15, MonthlyBonusTier::FifteenClients),
        ]
    );

    let lee = repo
        .get_sales_rep_by_email("lee@example.com")
        .await
        .expect("Lee should exist");
    let bonuses = repo
        .list_monthly_bonuses(lee.id)
        .await
        .expect("Failed to list bonuses");
    assert_eq!(bonuses.len(), 1);
    assert_eq!(bonuses[0].bonus_month, date(2024, 3, 1));
    assert_eq!(bonuses[0].tier, MonthlyBonusTier::FifteenClients);
    assert_eq!(bonuses[0].amount, dec!(1500));
    assert_eq!(bonuses[0].clients_closed, 15);

    // Replaying the month neither downgrades nor re-awards.
    let replay: Vec<DealRecord> = (0..15u32).map(|i| lee_deal(i, date(2024, 3, 1 + i))).collect();
    let summary = accrual.sync_deals(&replay).await.expect("Failed to re-sync deals");
    assert_eq!(summary.monthly_bonuses_awarded, 0);
    let bonuses = repo
        .list_monthly_bonuses(lee.id)
        .await
        .expect("Failed to list bonuses");
    assert_eq!(bonuses[0].tier, MonthlyBonusTier::FifteenClients);
}
