use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRep {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// For registering a rep (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSalesRep {
    pub email: String,
    pub name: String,
}

/// A "closed won" sale synced from the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub crm_deal_id: String,
    pub company_name: String,
    pub sales_rep_id: i64,

    // Contract values
    pub monthly_value: Decimal,
    pub setup_fee: Decimal,

    pub closed_date: NaiveDate,
    pub first_payment_date: NaiveDate,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For syncing deals (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeal {
    pub crm_deal_id: String,
    pub company_name: String,
    pub sales_rep_id: i64,
    pub monthly_value: Decimal,
    pub setup_fee: Decimal,
    pub closed_date: NaiveDate,
    pub first_payment_date: NaiveDate,
}
