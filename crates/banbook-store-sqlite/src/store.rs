//! [`SqliteStore`] — the SQLite implementation of [`CrmStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use banbook_core::{
  ban::Ban,
  client::Client,
  import::{ImportStats, NewAccount},
  store::{ClientQuery, CrmStore, DuplicateGroup, TableCounts},
  subscriber::Subscriber,
};

use crate::{
  Error, Result,
  encode::{
    RawBan, RawClient, RawSubscriber, encode_date, encode_dt, encode_status,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Matches clients lacking a business name (the "incomplete" report).
const INCOMPLETE_COND: &str =
  "(business_name IS NULL OR TRIM(business_name) = '')";

const CLIENT_COLS: &str = "client_id, name, business_name, email, address, \
                           city, is_active, created_at, updated_at";

// ─── Row readers ─────────────────────────────────────────────────────────────

fn client_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawClient> {
  Ok(RawClient {
    client_id:     row.get(0)?,
    name:          row.get(1)?,
    business_name: row.get(2)?,
    email:         row.get(3)?,
    address:       row.get(4)?,
    city:          row.get(5)?,
    is_active:     row.get(6)?,
    created_at:    row.get(7)?,
    updated_at:    row.get(8)?,
  })
}

fn ban_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawBan> {
  Ok(RawBan {
    ban_id:     row.get(0)?,
    client_id:  row.get(1)?,
    ban_number: row.get(2)?,
    status:     row.get(3)?,
    created_at: row.get(4)?,
    updated_at: row.get(5)?,
  })
}

fn subscriber_from_row(row: &rusqlite::Row) -> rusqlite::Result<RawSubscriber> {
  Ok(RawSubscriber {
    subscriber_id: row.get(0)?,
    ban_id:        row.get(1)?,
    phone:         row.get(2)?,
    status:        row.get(3)?,
    plan:          row.get(4)?,
    base:          row.get(5)?,
    monthly_value: row.get(6)?,
    contract_end:  row.get(7)?,
    notes:         row.get(8)?,
    created_at:    row.get(9)?,
    updated_at:    row.get(10)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A banbook CRM store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CrmStore impl ───────────────────────────────────────────────────────────

impl CrmStore for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CLIENT_COLS} FROM clients WHERE client_id = ?1"),
              rusqlite::params![id_str],
              client_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClient::into_client).transpose()
  }

  async fn list_clients(&self, query: &ClientQuery) -> Result<Vec<Client>> {
    let incomplete = query.incomplete_only;
    let limit_val = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawClient> = self
      .conn
      .call(move |conn| {
        let where_clause = if incomplete {
          format!("WHERE {INCOMPLETE_COND}")
        } else {
          String::new()
        };

        let sql = format!(
          "SELECT {CLIENT_COLS} FROM clients {where_clause}
           ORDER BY created_at ASC
           LIMIT ?1 OFFSET ?2"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], client_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClient::into_client).collect()
  }

  async fn count_clients(&self, query: &ClientQuery) -> Result<u64> {
    let incomplete = query.incomplete_only;

    let count: i64 = self
      .conn
      .call(move |conn| {
        let where_clause = if incomplete {
          format!("WHERE {INCOMPLETE_COND}")
        } else {
          String::new()
        };
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM clients {where_clause}"),
          [],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn find_ban(&self, ban_number: &str) -> Result<Option<Ban>> {
    let number = ban_number.to_string();

    let raw: Option<RawBan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT ban_id, client_id, ban_number, status, created_at,
                      updated_at
               FROM bans WHERE ban_number = ?1",
              rusqlite::params![number],
              ban_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBan::into_ban).transpose()
  }

  async fn list_bans(&self, client_id: Uuid) -> Result<Vec<Ban>> {
    let id_str = encode_uuid(client_id);

    let raws: Vec<RawBan> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT ban_id, client_id, ban_number, status, created_at,
                  updated_at
           FROM bans WHERE client_id = ?1
           ORDER BY ban_number",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], ban_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBan::into_ban).collect()
  }

  async fn list_subscribers(&self, ban_id: Uuid) -> Result<Vec<Subscriber>> {
    let id_str = encode_uuid(ban_id);

    let raws: Vec<RawSubscriber> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subscriber_id, ban_id, phone, status, plan, base,
                  monthly_value, contract_end, notes, created_at, updated_at
           FROM subscribers WHERE ban_id = ?1
           ORDER BY phone",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], subscriber_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscriber::into_subscriber).collect()
  }

  async fn counts(&self) -> Result<TableCounts> {
    let row: (i64, i64, i64, i64, i64, i64, i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          &format!(
            "SELECT
               (SELECT COUNT(*) FROM clients),
               (SELECT COUNT(*) FROM clients WHERE {INCOMPLETE_COND}),
               (SELECT COUNT(*) FROM bans),
               (SELECT COUNT(*) FROM bans WHERE status = 'active'),
               (SELECT COUNT(*) FROM bans WHERE status = 'cancelled'),
               (SELECT COUNT(*) FROM subscribers),
               (SELECT COUNT(*) FROM subscribers WHERE status = 'active'),
               (SELECT COUNT(*) FROM subscribers WHERE status = 'cancelled')"
          ),
          [],
          |row| {
            Ok((
              row.get(0)?,
              row.get(1)?,
              row.get(2)?,
              row.get(3)?,
              row.get(4)?,
              row.get(5)?,
              row.get(6)?,
              row.get(7)?,
            ))
          },
        )?)
      })
      .await?;

    Ok(TableCounts {
      clients:               row.0 as u64,
      incomplete_clients:    row.1 as u64,
      bans:                  row.2 as u64,
      bans_active:           row.3 as u64,
      bans_cancelled:        row.4 as u64,
      subscribers:           row.5 as u64,
      subscribers_active:    row.6 as u64,
      subscribers_cancelled: row.7 as u64,
    })
  }

  // ── Import ────────────────────────────────────────────────────────────────

  async fn import_accounts(
    &self,
    accounts: Vec<NewAccount>,
  ) -> Result<ImportStats> {
    let stats: ImportStats = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut stats = ImportStats::default();

        for account in &accounts {
          // Existence check runs before insert: re-running the same batch
          // creates nothing new.
          let exists: bool = tx
            .query_row(
              "SELECT 1 FROM bans WHERE ban_number = ?1",
              rusqlite::params![account.ban_number],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

          if exists {
            stats.bans_existing += 1;
            continue;
          }

          let now = encode_dt(Utc::now());

          let client_id = encode_uuid(Uuid::new_v4());
          tx.execute(
            "INSERT INTO clients (client_id, name, business_name, email,
                                  address, city, is_active, created_at,
                                  updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
            rusqlite::params![
              client_id,
              account.client_name(),
              account.business_name,
              account.email,
              account.address,
              account.city,
              now,
            ],
          )?;
          stats.clients_created += 1;

          let ban_id = encode_uuid(Uuid::new_v4());
          tx.execute(
            "INSERT INTO bans (ban_id, client_id, ban_number, status,
                               created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            rusqlite::params![
              ban_id,
              client_id,
              account.ban_number,
              encode_status(account.status),
              now,
            ],
          )?;
          stats.bans_created += 1;

          for sub in &account.subscribers {
            let subscriber_id = encode_uuid(Uuid::new_v4());
            let contract_end = sub.contract_end.map(encode_date);
            tx.execute(
              "INSERT INTO subscribers (subscriber_id, ban_id, phone, status,
                                        plan, base, monthly_value,
                                        contract_end, notes, created_at,
                                        updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
              rusqlite::params![
                subscriber_id,
                ban_id,
                sub.phone,
                encode_status(sub.status),
                sub.plan,
                sub.base,
                sub.monthly_value,
                contract_end,
                sub.notes,
                now,
              ],
            )?;
            stats.subscribers_created += 1;
          }
        }

        tx.commit()?;
        Ok(stats)
      })
      .await?;

    Ok(stats)
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  async fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>> {
    let raws: Vec<RawClient> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CLIENT_COLS} FROM clients
           WHERE business_name IS NOT NULL AND TRIM(business_name) != ''
           ORDER BY business_name, created_at"
        ))?;
        let rows = stmt
          .query_map([], client_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let clients: Vec<Client> = raws
      .into_iter()
      .map(RawClient::into_client)
      .collect::<Result<_>>()?;

    // Rows arrive sorted by business name, so grouping is a single pass.
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for client in clients {
      let name = match client.business_name.clone() {
        Some(n) => n,
        None => continue,
      };
      match groups.last_mut() {
        Some(g) if g.business_name == name => g.clients.push(client),
        _ => groups.push(DuplicateGroup {
          business_name: name,
          clients:       vec![client],
        }),
      }
    }

    groups.retain(|g| g.clients.len() > 1);
    Ok(groups)
  }

  async fn merge_clients(
    &self,
    principal: Uuid,
    duplicates: &[Uuid],
  ) -> Result<usize> {
    if duplicates.contains(&principal) {
      return Err(Error::Core(banbook_core::Error::SelfMerge));
    }

    let principal_str = encode_uuid(principal);
    let duplicate_strs: Vec<String> =
      duplicates.iter().copied().map(encode_uuid).collect();

    let (exists, moved): (bool, usize) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM clients WHERE client_id = ?1",
            rusqlite::params![principal_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok((false, 0));
        }

        let now = encode_dt(Utc::now());
        let mut moved = 0usize;

        for dup in &duplicate_strs {
          moved += tx.execute(
            "UPDATE bans SET client_id = ?1, updated_at = ?2
             WHERE client_id = ?3",
            rusqlite::params![principal_str, now, dup],
          )?;
          tx.execute(
            "DELETE FROM clients WHERE client_id = ?1",
            rusqlite::params![dup],
          )?;
        }

        tx.commit()?;
        Ok((true, moved))
      })
      .await?;

    if !exists {
      return Err(Error::ClientNotFound(principal));
    }
    Ok(moved)
  }
}
