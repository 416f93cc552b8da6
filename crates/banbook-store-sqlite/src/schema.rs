//! SQL schema for the banbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clients (
    client_id     TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    business_name TEXT,            -- NULL/blank marks an incomplete client
    email         TEXT,
    address       TEXT,
    city          TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at    TEXT NOT NULL
);

-- ban_number is the import pipeline's sole duplicate-detection key.
CREATE TABLE IF NOT EXISTS bans (
    ban_id     TEXT PRIMARY KEY,
    client_id  TEXT NOT NULL REFERENCES clients(client_id),
    ban_number TEXT NOT NULL UNIQUE,
    status     TEXT NOT NULL,      -- 'active' | 'cancelled'
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subscribers (
    subscriber_id TEXT PRIMARY KEY,
    ban_id        TEXT NOT NULL REFERENCES bans(ban_id),
    phone         TEXT NOT NULL,   -- digits only, at most 10
    status        TEXT NOT NULL,   -- 'active' | 'cancelled'
    plan          TEXT,
    base          TEXT,
    monthly_value REAL,
    contract_end  TEXT,            -- ISO 8601 date or NULL
    notes         TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS bans_client_idx      ON bans(client_id);
CREATE INDEX IF NOT EXISTS subscribers_ban_idx  ON subscribers(ban_id);
CREATE INDEX IF NOT EXISTS clients_business_idx ON clients(business_name);

PRAGMA user_version = 1;
";
