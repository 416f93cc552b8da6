//! BAN — Billing Account Number, the unit the import pipeline dedupes on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a BAN or subscriber line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  Active,
  Cancelled,
}

impl AccountStatus {
  /// Map a source-sheet status code. The source uses `"A"` for active;
  /// every other value (commonly `"C"`) is treated as cancelled.
  pub fn from_source_code(code: &str) -> Self {
    if code.trim().eq_ignore_ascii_case("A") {
      AccountStatus::Active
    } else {
      AccountStatus::Cancelled
    }
  }
}

/// A billing account. `ban_number` is unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
  pub ban_id:     Uuid,
  pub client_id:  Uuid,
  /// Normalized account number: digits only, at most 9 of them.
  pub ban_number: String,
  pub status:     AccountStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn source_code_a_maps_to_active() {
    assert_eq!(AccountStatus::from_source_code("A"), AccountStatus::Active);
    assert_eq!(AccountStatus::from_source_code(" a "), AccountStatus::Active);
  }

  #[test]
  fn other_codes_map_to_cancelled() {
    assert_eq!(
      AccountStatus::from_source_code("C"),
      AccountStatus::Cancelled
    );
    assert_eq!(
      AccountStatus::from_source_code(""),
      AccountStatus::Cancelled
    );
  }
}
