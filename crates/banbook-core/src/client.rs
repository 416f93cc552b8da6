//! Client — the business entity that owns billing accounts.
//!
//! A client row is created either by a CRUD form or by the import pipeline.
//! Imported clients with no business name use their BAN number as `name` so
//! they stay discoverable as incomplete (see [`Client::is_incomplete`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A business customer. Owns zero or more [`Ban`](crate::ban::Ban)s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
  pub client_id:     Uuid,
  /// Display name. Equals the BAN number for clients created by import
  /// without a business name.
  pub name:          String,
  pub business_name: Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  pub city:          Option<String>,
  pub is_active:     bool,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Client {
  /// An incomplete client lacks a business name and is surfaced for manual
  /// completion.
  pub fn is_incomplete(&self) -> bool {
    self
      .business_name
      .as_deref()
      .is_none_or(|b| b.trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(business_name: Option<&str>) -> Client {
    Client {
      client_id:     Uuid::new_v4(),
      name:          "900012345".to_string(),
      business_name: business_name.map(str::to_string),
      email:         None,
      address:       None,
      city:          None,
      is_active:     true,
      created_at:    Utc::now(),
      updated_at:    Utc::now(),
    }
  }

  #[test]
  fn missing_business_name_is_incomplete() {
    assert!(client(None).is_incomplete());
  }

  #[test]
  fn blank_business_name_is_incomplete() {
    assert!(client(Some("  ")).is_incomplete());
  }

  #[test]
  fn named_client_is_complete() {
    assert!(!client(Some("Ferreteria Central")).is_incomplete());
  }
}
