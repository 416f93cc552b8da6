//! Duplicate-client reconciliation.
//!
//! Imports dedupe on BAN number only, so two accounts naming the same
//! business produce two client rows. This pass folds them together: within
//! each group of clients sharing a business name, the earliest-created
//! client absorbs the BANs of the rest and the rest are deleted. Running it
//! again immediately is a no-op.

use banbook_core::store::CrmStore;

use crate::{Error, Result};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeReport {
  /// Duplicate groups found.
  pub groups:         usize,
  /// Client rows deleted after their BANs were reattached.
  pub clients_merged: usize,
  /// BANs moved to a principal client.
  pub bans_moved:     usize,
}

/// Merge every duplicate-client group in the store.
pub async fn merge_duplicate_clients<S: CrmStore>(
  store: &S,
) -> Result<MergeReport> {
  let groups = store
    .duplicate_groups()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let mut report = MergeReport { groups: groups.len(), ..Default::default() };

  for group in groups {
    let principal = group.clients[0].client_id;
    let duplicates: Vec<_> =
      group.clients[1..].iter().map(|c| c.client_id).collect();

    let moved = store
      .merge_clients(principal, &duplicates)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    tracing::info!(
      business_name = %group.business_name,
      merged = duplicates.len(),
      bans_moved = moved,
      "merged duplicate clients"
    );

    report.clients_merged += duplicates.len();
    report.bans_moved += moved;
  }

  Ok(report)
}

#[cfg(test)]
mod tests {
  use banbook_core::{
    ban::AccountStatus,
    import::NewAccount,
    store::{ClientQuery, CrmStore},
  };
  use banbook_store_sqlite::SqliteStore;

  use super::*;

  fn account(ban_number: &str, business_name: Option<&str>) -> NewAccount {
    NewAccount {
      ban_number:    ban_number.to_string(),
      status:        AccountStatus::Active,
      business_name: business_name.map(str::to_string),
      email:         None,
      address:       None,
      city:          None,
      subscribers:   vec![],
    }
  }

  #[tokio::test]
  async fn merges_groups_and_is_idempotent() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    store
      .import_accounts(vec![
        account("100000001", Some("Acme Corp")),
        account("100000002", Some("Acme Corp")),
        account("100000003", Some("Acme Corp")),
        account("100000004", Some("Solo SA")),
      ])
      .await
      .unwrap();

    let first = merge_duplicate_clients(&store).await.unwrap();
    assert_eq!(first.groups, 1);
    assert_eq!(first.clients_merged, 2);
    assert_eq!(first.bans_moved, 2);

    // The principal now owns all three Acme BANs.
    let clients = store.list_clients(&ClientQuery::default()).await.unwrap();
    let acme: Vec<_> = clients
      .iter()
      .filter(|c| c.business_name.as_deref() == Some("Acme Corp"))
      .collect();
    assert_eq!(acme.len(), 1);
    assert_eq!(store.list_bans(acme[0].client_id).await.unwrap().len(), 3);

    let second = merge_duplicate_clients(&store).await.unwrap();
    assert_eq!(second.groups, 0);
    assert_eq!(second.clients_merged, 0);
  }

  #[tokio::test]
  async fn clients_without_business_name_are_never_merged() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    store
      .import_accounts(vec![
        account("100000001", None),
        account("100000002", None),
      ])
      .await
      .unwrap();

    let report = merge_duplicate_clients(&store).await.unwrap();
    assert_eq!(report.groups, 0);

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.clients, 2);
    assert_eq!(counts.incomplete_clients, 2);
  }
}
