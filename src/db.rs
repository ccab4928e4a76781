// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Campaign, CampaignWithItems, LineItem, User};
use crate::utils::{parse_decimal, parse_storage_ts, to_storage_ts};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Campaignbook", "campaignbook"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("campaignbook.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        date_joined TEXT NOT NULL,
        last_login TEXT
    );

    CREATE TABLE IF NOT EXISTS sessions(
        session_key TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL,
        expire_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_expire_at ON sessions(expire_at);

    CREATE TABLE IF NOT EXISTS campaigns(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    -- amounts are exact decimal text
    CREATE TABLE IF NOT EXISTS line_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        campaign_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        booked_amount TEXT NOT NULL,
        actual_amount TEXT NOT NULL,
        adjustment_amount TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(campaign_id) REFERENCES campaigns(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_line_items_campaign ON line_items(campaign_id);
    "#,
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Users and sessions

pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users(username, password_hash, is_active, date_joined) VALUES (?1, ?2, 1, ?3)",
        params![username, password_hash, to_storage_ts(&now)],
    )
    .with_context(|| format!("Create user '{}'", username))?;
    Ok(conn.last_insert_rowid())
}

pub fn set_user_active(conn: &Connection, username: &str, active: bool) -> Result<bool> {
    let n = conn.execute(
        "UPDATE users SET is_active=?1 WHERE username=?2",
        params![active, username],
    )?;
    Ok(n > 0)
}

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<(i64, String, String, bool, Option<String>)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
}

fn user_model(raw: (i64, String, String, bool, Option<String>)) -> Result<User> {
    let (id, username, password_hash, is_active, last_login) = raw;
    Ok(User {
        id,
        username,
        password_hash,
        is_active,
        last_login: last_login.as_deref().map(parse_storage_ts).transpose()?,
    })
}

pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let raw = conn
        .query_row(
            "SELECT id, username, password_hash, is_active, last_login FROM users WHERE username=?1",
            params![username],
            user_from_row,
        )
        .optional()?;
    raw.map(user_model).transpose()
}

pub fn touch_last_login(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_login=?1 WHERE id=?2",
        params![to_storage_ts(&now), user_id],
    )?;
    Ok(())
}

pub fn insert_session(
    conn: &Connection,
    session_key: &str,
    user_id: i64,
    expire_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions(session_key, user_id, expire_at) VALUES (?1, ?2, ?3)",
        params![session_key, user_id, to_storage_ts(&expire_at)],
    )?;
    Ok(())
}

/// The active user behind an unexpired session, if any.
pub fn find_session_user(
    conn: &Connection,
    session_key: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>> {
    let raw = conn
        .query_row(
            "SELECT u.id, u.username, u.password_hash, u.is_active, u.last_login
             FROM sessions s JOIN users u ON s.user_id=u.id
             WHERE s.session_key=?1 AND s.expire_at>?2 AND u.is_active=1",
            params![session_key, to_storage_ts(&now)],
            user_from_row,
        )
        .optional()?;
    raw.map(user_model).transpose()
}

pub fn delete_session(conn: &Connection, session_key: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM sessions WHERE session_key=?1",
        params![session_key],
    )?;
    Ok(())
}

pub fn purge_expired_sessions(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM sessions WHERE expire_at<=?1",
        params![to_storage_ts(&now)],
    )?;
    Ok(n)
}

// ---------------------------------------------------------------------------
// Campaigns and line items

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub campaign_id: i64,
    pub name: String,
    pub booked_amount: Decimal,
    pub actual_amount: Decimal,
    pub adjustment_amount: Decimal,
}

const LINE_ITEM_COLUMNS: &str = "id, campaign_id, name, booked_amount, actual_amount, adjustment_amount, created_at, updated_at";

type RawLineItem = (i64, i64, String, String, String, String, String, String);

fn line_item_from_row(r: &Row<'_>) -> rusqlite::Result<RawLineItem> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
    ))
}

fn line_item_model(raw: RawLineItem) -> Result<LineItem> {
    let (id, campaign_id, name, booked, actual, adjustment, created, updated) = raw;
    Ok(LineItem {
        id,
        campaign_id,
        booked_amount: parse_decimal(&booked)
            .with_context(|| format!("Line item {} booked_amount", id))?,
        actual_amount: parse_decimal(&actual)
            .with_context(|| format!("Line item {} actual_amount", id))?,
        adjustment_amount: parse_decimal(&adjustment)
            .with_context(|| format!("Line item {} adjustment_amount", id))?,
        created_at: parse_storage_ts(&created)?,
        updated_at: parse_storage_ts(&updated)?,
        name,
    })
}

fn campaign_from_row(r: &Row<'_>) -> rusqlite::Result<(i64, String, String)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?))
}

fn campaign_model(raw: (i64, String, String)) -> Result<Campaign> {
    let (id, name, created) = raw;
    Ok(Campaign {
        id,
        name,
        created_at: parse_storage_ts(&created)?,
    })
}

pub fn insert_campaign(conn: &Connection, name: &str, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO campaigns(name, created_at) VALUES (?1, ?2)",
        params![name, to_storage_ts(&now)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Inserts a campaign under a caller-chosen id, or renames the existing one.
pub fn upsert_campaign(conn: &Connection, id: i64, name: &str, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO campaigns(id, name, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name",
        params![id, name, to_storage_ts(&now)],
    )?;
    Ok(())
}

pub fn insert_line_item(conn: &Connection, item: &NewLineItem, now: DateTime<Utc>) -> Result<i64> {
    let ts = to_storage_ts(&now);
    conn.execute(
        "INSERT INTO line_items(campaign_id, name, booked_amount, actual_amount, adjustment_amount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            item.campaign_id,
            item.name,
            item.booked_amount.to_string(),
            item.actual_amount.to_string(),
            item.adjustment_amount.to_string(),
            ts
        ],
    )
    .with_context(|| format!("Insert line item '{}' into campaign {}", item.name, item.campaign_id))?;
    Ok(conn.last_insert_rowid())
}

pub fn count_campaigns(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM campaigns", [], |r| r.get(0))?;
    Ok(n as usize)
}

pub fn get_campaign(conn: &Connection, id: i64) -> Result<Option<Campaign>> {
    let raw = conn
        .query_row(
            "SELECT id, name, created_at FROM campaigns WHERE id=?1",
            params![id],
            campaign_from_row,
        )
        .optional()?;
    raw.map(campaign_model).transpose()
}

fn query_campaigns(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<Campaign>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at FROM campaigns ORDER BY id LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map(params![limit, offset], campaign_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(campaign_model(row?)?);
    }
    Ok(out)
}

/// Loads the line items of every campaign in `campaigns` with a single query.
fn attach_line_items(conn: &Connection, campaigns: Vec<Campaign>) -> Result<Vec<CampaignWithItems>> {
    if campaigns.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; campaigns.len()].join(",");
    let sql = format!(
        "SELECT {} FROM line_items WHERE campaign_id IN ({}) ORDER BY id",
        LINE_ITEM_COLUMNS, placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(campaigns.iter().map(|c| c.id)), line_item_from_row)?;
    let mut by_campaign: HashMap<i64, Vec<LineItem>> = HashMap::new();
    for row in rows {
        let li = line_item_model(row?)?;
        by_campaign.entry(li.campaign_id).or_default().push(li);
    }
    Ok(campaigns
        .into_iter()
        .map(|campaign| CampaignWithItems {
            line_items: by_campaign.remove(&campaign.id).unwrap_or_default(),
            campaign,
        })
        .collect())
}

/// One page of campaigns in id order, each with its line items.
pub fn list_campaigns_page(
    conn: &Connection,
    offset: usize,
    limit: usize,
) -> Result<Vec<CampaignWithItems>> {
    let campaigns = query_campaigns(conn, limit as i64, offset as i64)?;
    attach_line_items(conn, campaigns)
}

pub fn all_campaigns_with_items(conn: &Connection) -> Result<Vec<CampaignWithItems>> {
    let campaigns = query_campaigns(conn, -1, 0)?;
    attach_line_items(conn, campaigns)
}

/// Line items of one campaign, ordered by id.
pub fn line_items_for_campaign(conn: &Connection, campaign_id: i64) -> Result<Vec<LineItem>> {
    let sql = format!(
        "SELECT {} FROM line_items WHERE campaign_id=?1 ORDER BY id",
        LINE_ITEM_COLUMNS
    );
    collect_line_items(conn, &sql, campaign_id)
}

/// Campaign plus line items, most recently updated first.
pub fn get_campaign_detail(conn: &Connection, id: i64) -> Result<Option<CampaignWithItems>> {
    let Some(campaign) = get_campaign(conn, id)? else {
        return Ok(None);
    };
    let sql = format!(
        "SELECT {} FROM line_items WHERE campaign_id=?1
         ORDER BY updated_at DESC, created_at DESC, id ASC",
        LINE_ITEM_COLUMNS
    );
    let line_items = collect_line_items(conn, &sql, id)?;
    Ok(Some(CampaignWithItems {
        campaign,
        line_items,
    }))
}

fn collect_line_items(conn: &Connection, sql: &str, campaign_id: i64) -> Result<Vec<LineItem>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![campaign_id], line_item_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(line_item_model(row?)?);
    }
    Ok(out)
}

pub fn get_line_item(conn: &Connection, id: i64) -> Result<Option<LineItem>> {
    let sql = format!("SELECT {} FROM line_items WHERE id=?1", LINE_ITEM_COLUMNS);
    let raw = conn
        .query_row(&sql, params![id], line_item_from_row)
        .optional()?;
    raw.map(line_item_model).transpose()
}

/// Refreshes `updated_at`, writing `adjustment_amount` too when given.
/// Returns false when no such line item exists.
pub fn update_adjustment(
    conn: &Connection,
    id: i64,
    adjustment: Option<Decimal>,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "UPDATE line_items
         SET adjustment_amount=COALESCE(?1, adjustment_amount), updated_at=?2
         WHERE id=?3",
        params![
            adjustment.map(|d| d.to_string()),
            to_storage_ts(&now),
            id
        ],
    )?;
    Ok(n > 0)
}
