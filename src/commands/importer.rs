// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{self, NewLineItem};
use crate::utils::parse_amount;
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("line-items", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let summary = import_line_items(conn, Path::new(path))?;
            println!(
                "Imported {} line items across {} campaigns from {}",
                summary.line_items, summary.campaigns, path
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

/// One row of the source dump. Amounts may be JSON numbers or strings.
#[derive(Debug, Deserialize)]
struct SourceRow {
    campaign_id: i64,
    campaign_name: String,
    line_item_name: String,
    booked_amount: Value,
    actual_amount: Value,
    #[serde(alias = "adjustment_amount")]
    adjustments: Value,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub campaigns: usize,
    pub line_items: usize,
}

fn amount(v: &Value, field: &str, row: usize) -> Result<Decimal> {
    let raw = match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(anyhow!("Row {}: {} must be a number, got {}", row, field, other)),
    };
    parse_amount(&raw).with_context(|| format!("Row {}: {}", row, field))
}

/// Loads a JSON array of line item rows in one transaction. Campaigns keep
/// their source ids; line items are appended.
pub fn import_line_items(conn: &mut Connection, path: &Path) -> Result<ImportSummary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Open JSON {}", path.display()))?;
    let rows: Vec<SourceRow> = serde_json::from_str(&text)
        .with_context(|| format!("Parse JSON {}", path.display()))?;

    let now = Utc::now();
    let tx = conn.transaction()?;
    let mut seen = HashSet::new();
    for (i, row) in rows.iter().enumerate() {
        let n = i + 1;
        if seen.insert(row.campaign_id) {
            db::upsert_campaign(&tx, row.campaign_id, row.campaign_name.trim(), now)?;
        }
        let item = NewLineItem {
            campaign_id: row.campaign_id,
            name: row.line_item_name.trim().to_string(),
            booked_amount: amount(&row.booked_amount, "booked_amount", n)?,
            actual_amount: amount(&row.actual_amount, "actual_amount", n)?,
            adjustment_amount: amount(&row.adjustments, "adjustments", n)?,
        };
        db::insert_line_item(&tx, &item, now)?;
    }
    tx.commit()?;

    let summary = ImportSummary {
        campaigns: seen.len(),
        line_items: rows.len(),
    };
    tracing::info!(
        path = %path.display(),
        campaigns = summary.campaigns,
        line_items = summary.line_items,
        "import finished"
    );
    Ok(summary)
}
