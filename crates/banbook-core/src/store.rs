//! The `CrmStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `banbook-store-sqlite`). Higher layers (`banbook-import`, `banbook-api`,
//! `banbook-cli`) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  ban::Ban,
  client::Client,
  import::{ImportStats, NewAccount},
  subscriber::Subscriber,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`CrmStore::list_clients`].
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
  /// Only return clients lacking a business name.
  pub incomplete_only: bool,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

/// A set of clients sharing the same non-empty business name, ordered by
/// `created_at` ascending; `clients[0]` is the merge principal.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
  pub business_name: String,
  pub clients:       Vec<Client>,
}

/// Row counts per table and status, for health checks and the verify report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCounts {
  pub clients:               u64,
  pub incomplete_clients:    u64,
  pub bans:                  u64,
  pub bans_active:           u64,
  pub bans_cancelled:        u64,
  pub subscribers:           u64,
  pub subscribers_active:    u64,
  pub subscribers_cancelled: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a banbook storage backend.
///
/// Import writes are batched: [`CrmStore::import_accounts`] applies a whole
/// batch inside one transaction and skips accounts whose BAN number already
/// exists. All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CrmStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a client by UUID. Returns `None` if not found.
  fn get_client(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// List clients matching `query`, ordered by `created_at` ascending.
  fn list_clients<'a>(
    &'a self,
    query: &'a ClientQuery,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + 'a;

  /// Count clients matching `query`, ignoring limit/offset.
  fn count_clients<'a>(
    &'a self,
    query: &'a ClientQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Look up a BAN by its normalized number.
  fn find_ban<'a>(
    &'a self,
    ban_number: &'a str,
  ) -> impl Future<Output = Result<Option<Ban>, Self::Error>> + Send + 'a;

  /// All BANs belonging to `client_id`.
  fn list_bans(
    &self,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Ban>, Self::Error>> + Send + '_;

  /// All subscriber lines under `ban_id`.
  fn list_subscribers(
    &self,
    ban_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscriber>, Self::Error>> + Send + '_;

  /// Table/status counts for health checks and verification reports.
  fn counts(
    &self,
  ) -> impl Future<Output = Result<TableCounts, Self::Error>> + Send + '_;

  // ── Import ────────────────────────────────────────────────────────────

  /// Apply one import batch in a single transaction.
  ///
  /// For each account whose `ban_number` is not yet present: create the
  /// client, the BAN, and its subscribers. Accounts with an existing BAN
  /// are counted in [`ImportStats::bans_existing`] and skipped, which makes
  /// a re-run of the same batch a no-op.
  fn import_accounts(
    &self,
    accounts: Vec<NewAccount>,
  ) -> impl Future<Output = Result<ImportStats, Self::Error>> + Send + '_;

  // ── Reconciliation ────────────────────────────────────────────────────

  /// Clients sharing a non-empty business name, grouped; only groups with
  /// more than one member are returned.
  fn duplicate_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<DuplicateGroup>, Self::Error>> + Send + '_;

  /// Reattach every BAN of `duplicates` to `principal`, then delete the
  /// duplicate clients, inside one transaction. Returns the number of BANs
  /// moved.
  fn merge_clients<'a>(
    &'a self,
    principal: Uuid,
    duplicates: &'a [Uuid],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
