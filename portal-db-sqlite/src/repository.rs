use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate, Utc};
use portal_core::{
    CommissionRecord, CommissionType, Deal, FeeResult, MilestoneBonus, MilestoneTier,
    MonthlyBonus, MonthlyBonusTier, NewCommissionRecord, NewDeal, NewMilestoneBonus,
    NewMonthlyBonus, NewQuote, NewSalesRep, PortalRepository, Quote, RepositoryError, SalesRep,
};
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row, Type};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        // Every connection to `:memory:` opens a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        debug!("database migrations applied");
        Ok(())
    }

    async fn get_deal_by_crm_id(
        &self,
        crm_deal_id: &str,
    ) -> Result<Deal, RepositoryError> {
        let row = sqlx::query(&format!("{DEAL_COLUMNS} WHERE crm_deal_id = ?"))
            .bind(crm_deal_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_deal(&row)
    }
}

const SALES_REP_COLUMNS: &str = "SELECT id, email, name, created_at FROM sales_reps";

const DEAL_COLUMNS: &str = "SELECT id, crm_deal_id, company_name, sales_rep_id, monthly_value,
        setup_fee, closed_date, first_payment_date, created_at, updated_at
     FROM deals";

const COMMISSION_COLUMNS: &str = "SELECT id, deal_id, sales_rep_id, commission_type, rate,
        base_amount, amount, month_number, payment_month, created_at
     FROM commissions";

const MONTHLY_BONUS_COLUMNS: &str = "SELECT id, sales_rep_id, bonus_month, tier, amount,
        reward_description, clients_closed, awarded_at
     FROM monthly_bonuses";

const MILESTONE_BONUS_COLUMNS: &str = "SELECT id, sales_rep_id, milestone, amount,
        equity_offer, clients_closed, awarded_at
     FROM milestone_bonuses";

const QUOTE_COLUMNS: &str = "SELECT id, contact_email, input_json, bookkeeping_monthly,
        bookkeeping_setup, taas_monthly, taas_setup, total_monthly, total_setup,
        created_at, updated_at
     FROM quotes";

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn row_to_sales_rep(row: &SqliteRow) -> Result<SalesRep, RepositoryError> {
    Ok(SalesRep {
        id: column(row, "id")?,
        email: column(row, "email")?,
        name: column(row, "name")?,
        created_at: column(row, "created_at")?,
    })
}

fn row_to_deal(row: &SqliteRow) -> Result<Deal, RepositoryError> {
    Ok(Deal {
        id: column(row, "id")?,
        crm_deal_id: column(row, "crm_deal_id")?,
        company_name: column(row, "company_name")?,
        sales_rep_id: column(row, "sales_rep_id")?,
        monthly_value: get_decimal(row, "monthly_value")?,
        setup_fee: get_decimal(row, "setup_fee")?,
        closed_date: column(row, "closed_date")?,
        first_payment_date: column(row, "first_payment_date")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn row_to_commission(row: &SqliteRow) -> Result<CommissionRecord, RepositoryError> {
    let type_str: String = column(row, "commission_type")?;
    let commission_type = CommissionType::parse(&type_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid commission type: {}", type_str))
    })?;

    Ok(CommissionRecord {
        id: column(row, "id")?,
        deal_id: column(row, "deal_id")?,
        sales_rep_id: column(row, "sales_rep_id")?,
        commission_type,
        rate: get_decimal(row, "rate")?,
        base_amount: get_decimal(row, "base_amount")?,
        amount: get_decimal(row, "amount")?,
        month_number: column(row, "month_number")?,
        payment_month: column(row, "payment_month")?,
        created_at: column(row, "created_at")?,
    })
}

fn row_to_monthly_bonus(row: &SqliteRow) -> Result<MonthlyBonus, RepositoryError> {
    let tier_str: String = column(row, "tier")?;
    let tier = MonthlyBonusTier::parse(&tier_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid monthly bonus tier: {}", tier_str))
    })?;

    Ok(MonthlyBonus {
        id: column(row, "id")?,
        sales_rep_id: column(row, "sales_rep_id")?,
        bonus_month: column(row, "bonus_month")?,
        tier,
        amount: get_decimal(row, "amount")?,
        reward_description: column(row, "reward_description")?,
        clients_closed: column(row, "clients_closed")?,
        awarded_at: column(row, "awarded_at")?,
    })
}

fn row_to_milestone_bonus(row: &SqliteRow) -> Result<MilestoneBonus, RepositoryError> {
    let tier_str: String = column(row, "milestone")?;
    let tier = MilestoneTier::parse(&tier_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid milestone: {}", tier_str))
    })?;

    Ok(MilestoneBonus {
        id: column(row, "id")?,
        sales_rep_id: column(row, "sales_rep_id")?,
        tier,
        amount: get_decimal(row, "amount")?,
        equity_offer: column(row, "equity_offer")?,
        clients_closed: column(row, "clients_closed")?,
        awarded_at: column(row, "awarded_at")?,
    })
}

fn row_to_quote(row: &SqliteRow) -> Result<Quote, RepositoryError> {
    let input_json: String = column(row, "input_json")?;
    let input = serde_json::from_str(&input_json)
        .map_err(|e| RepositoryError::Database(format!("Invalid quote input: {}", e)))?;

    Ok(Quote {
        id: column(row, "id")?,
        contact_email: column(row, "contact_email")?,
        input,
        bookkeeping: FeeResult::new(
            get_decimal(row, "bookkeeping_monthly")?,
            get_decimal(row, "bookkeeping_setup")?,
        ),
        taas: FeeResult::new(
            get_decimal(row, "taas_monthly")?,
            get_decimal(row, "taas_setup")?,
        ),
        total: FeeResult::new(
            get_decimal(row, "total_monthly")?,
            get_decimal(row, "total_setup")?,
        ),
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Half-open `[first day, first day of next month)` around `month`.
fn month_bounds(month: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = month.with_day(1).unwrap_or(month);
    let end = start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    (start, end)
}

#[async_trait]
impl PortalRepository for SqliteRepository {
    async fn upsert_sales_rep(
        &self,
        rep: NewSalesRep,
    ) -> Result<SalesRep, RepositoryError> {
        sqlx::query(
            "INSERT INTO sales_reps (email, name, created_at) VALUES (?, ?, ?)
             ON CONFLICT (email) DO UPDATE SET name = excluded.name",
        )
        .bind(&rep.email)
        .bind(&rep.name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        self.get_sales_rep_by_email(&rep.email).await
    }

    async fn get_sales_rep(
        &self,
        id: i64,
    ) -> Result<SalesRep, RepositoryError> {
        let row = sqlx::query(&format!("{SALES_REP_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_sales_rep(&row)
    }

    async fn get_sales_rep_by_email(
        &self,
        email: &str,
    ) -> Result<SalesRep, RepositoryError> {
        let row = sqlx::query(&format!("{SALES_REP_COLUMNS} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_sales_rep(&row)
    }

    async fn list_sales_reps(&self) -> Result<Vec<SalesRep>, RepositoryError> {
        let rows = sqlx::query(&format!("{SALES_REP_COLUMNS} ORDER BY name, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_sales_rep).collect()
    }

    async fn upsert_deal(
        &self,
        deal: NewDeal,
    ) -> Result<Deal, RepositoryError> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO deals (
                crm_deal_id, company_name, sales_rep_id, monthly_value, setup_fee,
                closed_date, first_payment_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (crm_deal_id) DO UPDATE SET
                company_name = excluded.company_name,
                sales_rep_id = excluded.sales_rep_id,
                monthly_value = excluded.monthly_value,
                setup_fee = excluded.setup_fee,
                closed_date = excluded.closed_date,
                first_payment_date = excluded.first_payment_date,
                updated_at = excluded.updated_at",
        )
        .bind(&deal.crm_deal_id)
        .bind(&deal.company_name)
        .bind(deal.sales_rep_id)
        .bind(decimal_to_text(deal.monthly_value))
        .bind(decimal_to_text(deal.setup_fee))
        .bind(deal.closed_date)
        .bind(deal.first_payment_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        self.get_deal_by_crm_id(&deal.crm_deal_id).await
    }

    async fn get_deal(
        &self,
        id: i64,
    ) -> Result<Deal, RepositoryError> {
        let row = sqlx::query(&format!("{DEAL_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_deal(&row)
    }

    async fn list_deals_for_rep(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<Deal>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{DEAL_COLUMNS} WHERE sales_rep_id = ? ORDER BY closed_date, id"
        ))
        .bind(sales_rep_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_deal).collect()
    }

    async fn has_commission_records(
        &self,
        deal_id: i64,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM commissions WHERE deal_id = ?) AS present")
            .bind(deal_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        column(&row, "present")
    }

    async fn insert_commission_records(
        &self,
        records: &[NewCommissionRecord],
    ) -> Result<usize, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut inserted = 0;

        for record in records {
            let result = sqlx::query(
                "INSERT INTO commissions (
                    deal_id, sales_rep_id, commission_type, rate, base_amount, amount,
                    month_number, payment_month, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (deal_id, commission_type, month_number) DO NOTHING",
            )
            .bind(record.deal_id)
            .bind(record.sales_rep_id)
            .bind(record.commission_type.as_str())
            .bind(decimal_to_text(record.rate))
            .bind(decimal_to_text(record.base_amount))
            .bind(decimal_to_text(record.amount))
            .bind(record.month_number)
            .bind(record.payment_month)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

            inserted += result.rows_affected() as usize;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(inserted)
    }

    async fn list_commissions_for_deal(
        &self,
        deal_id: i64,
    ) -> Result<Vec<CommissionRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{COMMISSION_COLUMNS} WHERE deal_id = ? ORDER BY month_number, id"
        ))
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_commission).collect()
    }

    async fn list_commissions_for_rep(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<CommissionRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{COMMISSION_COLUMNS} WHERE sales_rep_id = ? ORDER BY payment_month, deal_id, id"
        ))
        .bind(sales_rep_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_commission).collect()
    }

    async fn award_monthly_bonus(
        &self,
        bonus: NewMonthlyBonus,
    ) -> Result<bool, RepositoryError> {
        let (bonus_month, _) = month_bounds(bonus.bonus_month);

        let result = sqlx::query(
            "INSERT INTO monthly_bonuses (
                sales_rep_id, bonus_month, tier, amount, reward_description,
                clients_closed, awarded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (sales_rep_id, bonus_month) DO UPDATE SET
                tier = excluded.tier,
                amount = excluded.amount,
                reward_description = excluded.reward_description,
                clients_closed = excluded.clients_closed,
                awarded_at = excluded.awarded_at
            WHERE CAST(excluded.amount AS REAL) > CAST(monthly_bonuses.amount AS REAL)",
        )
        .bind(bonus.sales_rep_id)
        .bind(bonus_month)
        .bind(bonus.tier.as_str())
        .bind(decimal_to_text(bonus.amount))
        .bind(&bonus.reward_description)
        .bind(bonus.clients_closed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let awarded = result.rows_affected() == 1;
        if !awarded {
            debug!(
                sales_rep_id = bonus.sales_rep_id,
                %bonus_month,
                "monthly bonus already held at this tier or higher"
            );
        }
        Ok(awarded)
    }

    async fn list_monthly_bonuses(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<MonthlyBonus>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{MONTHLY_BONUS_COLUMNS} WHERE sales_rep_id = ? ORDER BY bonus_month"
        ))
        .bind(sales_rep_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_monthly_bonus).collect()
    }

    async fn award_milestone_bonus(
        &self,
        bonus: NewMilestoneBonus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO milestone_bonuses (
                sales_rep_id, milestone, amount, equity_offer, clients_closed, awarded_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (sales_rep_id, milestone) DO NOTHING",
        )
        .bind(bonus.sales_rep_id)
        .bind(bonus.tier.as_str())
        .bind(decimal_to_text(bonus.amount))
        .bind(bonus.equity_offer)
        .bind(bonus.clients_closed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_milestone_bonuses(
        &self,
        sales_rep_id: i64,
    ) -> Result<Vec<MilestoneBonus>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{MILESTONE_BONUS_COLUMNS} WHERE sales_rep_id = ? ORDER BY clients_closed, id"
        ))
        .bind(sales_rep_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut bonuses = rows
            .iter()
            .map(row_to_milestone_bonus)
            .collect::<Result<Vec<_>, _>>()?;
        bonuses.sort_by_key(|bonus| bonus.tier);
        Ok(bonuses)
    }

    async fn count_clients_closed_in_month(
        &self,
        sales_rep_id: i64,
        month: NaiveDate,
    ) -> Result<u32, RepositoryError> {
        let (start, end) = month_bounds(month);

        let row = sqlx::query(
            "SELECT COUNT(*) AS closed FROM deals
             WHERE sales_rep_id = ? AND closed_date >= ? AND closed_date < ?",
        )
        .bind(sales_rep_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        column(&row, "closed")
    }

    async fn count_clients_closed_total(
        &self,
        sales_rep_id: i64,
    ) -> Result<u32, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS closed FROM deals WHERE sales_rep_id = ?")
            .bind(sales_rep_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        column(&row, "closed")
    }

    async fn create_quote(
        &self,
        quote: NewQuote,
    ) -> Result<Quote, RepositoryError> {
        let now = Utc::now();
        let input_json = serde_json::to_string(&quote.input)
            .map_err(|e| RepositoryError::Database(format!("Failed to encode quote input: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO quotes (
                contact_email, input_json, bookkeeping_monthly, bookkeeping_setup,
                taas_monthly, taas_setup, total_monthly, total_setup, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&quote.contact_email)
        .bind(input_json)
        .bind(decimal_to_text(quote.bookkeeping.monthly_fee))
        .bind(decimal_to_text(quote.bookkeeping.setup_fee))
        .bind(decimal_to_text(quote.taas.monthly_fee))
        .bind(decimal_to_text(quote.taas.setup_fee))
        .bind(decimal_to_text(quote.total.monthly_fee))
        .bind(decimal_to_text(quote.total.setup_fee))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        self.get_quote(id).await
    }

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<Quote, RepositoryError> {
        let row = sqlx::query(&format!("{QUOTE_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_quote(&row)
    }

    async fn list_quotes(
        &self,
        contact_email: Option<&str>,
    ) -> Result<Vec<Quote>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{QUOTE_COLUMNS} WHERE (? IS NULL OR contact_email = ?) ORDER BY id"
        ))
        .bind(contact_email)
        .bind(contact_email)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_quote).collect()
    }
}
