//! SQL schema for the Stargaze SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS skies (
    sky_id      TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- The per-sky action registry. Rows are never updated.
CREATE TABLE IF NOT EXISTS actions (
    sky_id  TEXT NOT NULL REFERENCES skies(sky_id),
    key     TEXT NOT NULL,
    label   TEXT NOT NULL,
    weight  INTEGER NOT NULL DEFAULT 1 CHECK (weight >= 1),
    phase   TEXT NOT NULL,          -- 'before' | 'day'
    kind    TEXT NOT NULL DEFAULT 'in_person',
    PRIMARY KEY (sky_id, key)
);

-- Participations are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS participations (
    participation_id TEXT PRIMARY KEY,
    sky_id           TEXT NOT NULL REFERENCES skies(sky_id),
    action_key       TEXT NOT NULL,
    name             TEXT,
    email            TEXT,
    comment          TEXT,
    created_at       TEXT NOT NULL   -- ISO 8601 UTC; server-assigned
);

-- Precomputed totals, kept current by the trigger below.
CREATE TABLE IF NOT EXISTS sky_summaries (
    sky_id        TEXT PRIMARY KEY REFERENCES skies(sky_id),
    total_stars   INTEGER NOT NULL,
    total_actions INTEGER NOT NULL,
    updated_at    TEXT
);

CREATE TRIGGER IF NOT EXISTS participations_summarise
AFTER INSERT ON participations
BEGIN
    INSERT INTO sky_summaries (sky_id, total_stars, total_actions, updated_at)
    VALUES (
        NEW.sky_id,
        COALESCE((SELECT weight FROM actions
                  WHERE sky_id = NEW.sky_id AND key = NEW.action_key), 1),
        1,
        NEW.created_at
    )
    ON CONFLICT (sky_id) DO UPDATE SET
        total_stars   = total_stars + excluded.total_stars,
        total_actions = total_actions + 1,
        updated_at    = excluded.updated_at;
END;

CREATE INDEX IF NOT EXISTS participations_sky_idx
    ON participations(sky_id, created_at);

PRAGMA user_version = 1;
";
