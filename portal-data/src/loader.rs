use std::io::Read;

use chrono::NaiveDate;
use portal_core::{NewDeal, NewSalesRep, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading closed deals.
#[derive(Debug, Error)]
pub enum DealLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Deal '{crm_deal_id}' has a negative {field}: {value}")]
    InvalidAmount {
        crm_deal_id: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for DealLoaderError {
    fn from(err: csv::Error) -> Self {
        DealLoaderError::CsvParse(err.to_string())
    }
}

/// One row of a CRM "closed won" export.
///
/// - `crm_deal_id`: the CRM's deal id; re-loading the same id updates the deal
/// - `sales_rep_email` / `sales_rep_name`: the owning rep, created on first sight
/// - `monthly_value`: recurring contract value; `$` and thousands separators are accepted
/// - `setup_fee`: one-time fee; empty means no setup fee
/// - `closed_date`: the date the deal was won (`YYYY-MM-DD`)
/// - `first_payment_date`: empty means the client pays on the closed date
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealRecord {
    pub crm_deal_id: String,
    pub company_name: String,
    pub sales_rep_email: String,
    pub sales_rep_name: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub monthly_value: Decimal,
    #[serde(deserialize_with = "deserialize_optional_amount")]
    pub setup_fee: Option<Decimal>,
    pub closed_date: NaiveDate,
    pub first_payment_date: Option<NaiveDate>,
}

impl DealRecord {
    pub fn sales_rep(&self) -> NewSalesRep {
        NewSalesRep {
            email: self.sales_rep_email.trim().to_lowercase(),
            name: self.sales_rep_name.trim().to_string(),
        }
    }

    pub fn to_new_deal(
        &self,
        sales_rep_id: i64,
    ) -> NewDeal {
        NewDeal {
            crm_deal_id: self.crm_deal_id.clone(),
            company_name: self.company_name.clone(),
            sales_rep_id,
            monthly_value: self.monthly_value,
            setup_fee: self.setup_fee.unwrap_or(Decimal::ZERO),
            closed_date: self.closed_date,
            first_payment_date: self.first_payment_date.unwrap_or(self.closed_date),
        }
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{}': {}", raw, e))
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_amount(&s).map_err(serde::de::Error::custom)
}

fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_amount(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reader for closed-deal CSV exports.
///
/// Parsing and validation are separate so a caller can report every bad row
/// before touching the database. Persisting the rows is the job of
/// [`crate::CommissionAccrual`].
pub struct DealLoader;

impl DealLoader {
    /// Parse deal records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<DealRecord>, DealLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: DealRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Reject any record with a negative contract value.
    ///
    /// Zero is allowed; a deal with no setup fee simply earns no setup
    /// commission.
    pub fn validate(records: &[DealRecord]) -> Result<(), DealLoaderError> {
        for record in records {
            let amounts = [
                ("monthly value", Some(record.monthly_value)),
                ("setup fee", record.setup_fee),
            ];
            for (field, value) in amounts {
                if let Some(value) = value.filter(|v| *v < Decimal::ZERO) {
                    return Err(DealLoaderError::InvalidAmount {
                        crm_deal_id: record.crm_deal_id.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}
