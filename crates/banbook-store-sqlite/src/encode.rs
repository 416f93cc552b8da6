//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; contract end dates as
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings.

use banbook_core::{
  ban::{AccountStatus, Ban},
  client::Client,
  subscriber::Subscriber,
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AccountStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: AccountStatus) -> &'static str {
  match s {
    AccountStatus::Active => "active",
    AccountStatus::Cancelled => "cancelled",
  }
}

pub fn decode_status(s: &str) -> Result<AccountStatus> {
  match s {
    "active" => Ok(AccountStatus::Active),
    "cancelled" => Ok(AccountStatus::Cancelled),
    other => Err(Error::DateParse(format!("unknown status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `clients` row.
pub struct RawClient {
  pub client_id:     String,
  pub name:          String,
  pub business_name: Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  pub city:          Option<String>,
  pub is_active:     bool,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawClient {
  pub fn into_client(self) -> Result<Client> {
    Ok(Client {
      client_id:     decode_uuid(&self.client_id)?,
      name:          self.name,
      business_name: self.business_name,
      email:         self.email,
      address:       self.address,
      city:          self.city,
      is_active:     self.is_active,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `bans` row.
pub struct RawBan {
  pub ban_id:     String,
  pub client_id:  String,
  pub ban_number: String,
  pub status:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawBan {
  pub fn into_ban(self) -> Result<Ban> {
    Ok(Ban {
      ban_id:     decode_uuid(&self.ban_id)?,
      client_id:  decode_uuid(&self.client_id)?,
      ban_number: self.ban_number,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `subscribers` row.
pub struct RawSubscriber {
  pub subscriber_id: String,
  pub ban_id:        String,
  pub phone:         String,
  pub status:        String,
  pub plan:          Option<String>,
  pub base:          Option<String>,
  pub monthly_value: Option<f64>,
  pub contract_end:  Option<String>,
  pub notes:         Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawSubscriber {
  pub fn into_subscriber(self) -> Result<Subscriber> {
    let contract_end = self
      .contract_end
      .as_deref()
      .map(decode_date)
      .transpose()?;

    Ok(Subscriber {
      subscriber_id: decode_uuid(&self.subscriber_id)?,
      ban_id:        decode_uuid(&self.ban_id)?,
      phone:         self.phone,
      status:        decode_status(&self.status)?,
      plan:          self.plan,
      base:          self.base,
      monthly_value: self.monthly_value,
      contract_end,
      notes:         self.notes,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
