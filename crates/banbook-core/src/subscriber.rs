//! Subscriber — an individual phone line linked to a BAN.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ban::AccountStatus;

/// A phone line/service instance. `phone` holds digits only, at most 10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
  pub subscriber_id: Uuid,
  pub ban_id:        Uuid,
  pub phone:         String,
  pub status:        AccountStatus,
  pub plan:          Option<String>,
  pub base:          Option<String>,
  /// Monthly price after normalization (comma decimal separator already
  /// converted).
  pub monthly_value: Option<f64>,
  /// Computed as import date plus the sheet's contract-months column.
  pub contract_end:  Option<NaiveDate>,
  pub notes:         Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}
