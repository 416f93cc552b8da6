//! Input types for the persistence writer.
//!
//! An import batch is a list of [`NewAccount`]s — one per BAN found in the
//! source sheet, each carrying its subscribers. The store applies a batch in
//! a single transaction, skipping BANs that already exist.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ban::AccountStatus;

/// A BAN group to be written: one client, one BAN, zero or more subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
  /// Normalized account number (digits only). The duplicate-detection key.
  pub ban_number:    String,
  pub status:        AccountStatus,
  pub business_name: Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  pub city:          Option<String>,
  pub subscribers:   Vec<NewSubscriber>,
}

impl NewAccount {
  /// Display name for the client row: the business name when present, else
  /// the BAN number itself so the row is later discoverable as incomplete.
  pub fn client_name(&self) -> &str {
    match self.business_name.as_deref() {
      Some(b) if !b.trim().is_empty() => b,
      _ => &self.ban_number,
    }
  }
}

/// A subscriber line to be written under a [`NewAccount`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscriber {
  /// Normalized phone: digits only, last 10 kept, at least 8 present.
  pub phone:         String,
  pub status:        AccountStatus,
  pub plan:          Option<String>,
  pub base:          Option<String>,
  pub monthly_value: Option<f64>,
  pub contract_end:  Option<NaiveDate>,
  pub notes:         Option<String>,
}

/// Counters returned by the persistence writer for one batch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportStats {
  pub clients_created:     usize,
  pub bans_created:        usize,
  pub subscribers_created: usize,
  /// BANs skipped because their number already existed in the store.
  pub bans_existing:       usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn account(business_name: Option<&str>) -> NewAccount {
    NewAccount {
      ban_number:    "123456789".to_string(),
      status:        AccountStatus::Active,
      business_name: business_name.map(str::to_string),
      email:         None,
      address:       None,
      city:          None,
      subscribers:   vec![],
    }
  }

  #[test]
  fn client_name_prefers_business_name() {
    assert_eq!(account(Some("Acme Corp")).client_name(), "Acme Corp");
  }

  #[test]
  fn client_name_falls_back_to_ban_number() {
    assert_eq!(account(None).client_name(), "123456789");
    assert_eq!(account(Some("   ")).client_name(), "123456789");
  }
}
