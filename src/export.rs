// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CSV rendering shared by the HTTP downloads and `export` subcommands.

use crate::models::{Campaign, CampaignWithItems, LineItem};
use crate::utils::{export_stamp, fmt_decimal, fmt_iso};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;

pub const CAMPAIGN_HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Created At",
    "Potential Invoice Amount",
    "Line Items Count",
    "Total Booked Amount",
    "Total Actual Amount",
    "Total Adjustment Amount",
];

pub const LINE_ITEM_HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Booked Amount",
    "Actual Amount",
    "Adjustment Amount",
    "Final Amount",
    "Campaign ID",
    "Campaign Name",
];

pub fn write_campaigns<W: Write>(out: W, campaigns: &[CampaignWithItems]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CAMPAIGN_HEADERS)?;
    for c in campaigns {
        let totals = c
            .totals()
            .with_context(|| format!("Totals for campaign {}", c.campaign.id))?;
        wtr.write_record([
            c.campaign.id.to_string(),
            c.campaign.name.clone(),
            fmt_iso(&c.campaign.created_at),
            fmt_decimal(&totals.final_amount()?),
            totals.count.to_string(),
            fmt_decimal(&totals.booked),
            fmt_decimal(&totals.actual),
            fmt_decimal(&totals.adjustment),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_line_items<W: Write>(out: W, campaign: &Campaign, items: &[LineItem]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(LINE_ITEM_HEADERS)?;
    for li in items {
        let final_amount = li
            .final_amount()
            .with_context(|| format!("Final amount for line item {}", li.id))?;
        wtr.write_record([
            li.id.to_string(),
            li.name.clone(),
            fmt_decimal(&li.booked_amount),
            fmt_decimal(&li.actual_amount),
            fmt_decimal(&li.adjustment_amount),
            fmt_decimal(&final_amount),
            campaign.id.to_string(),
            campaign.name.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn campaigns_filename(now: &DateTime<Utc>) -> String {
    format!("campaigns_export_{}.csv", export_stamp(now))
}

pub fn line_items_filename(campaign_id: i64, now: &DateTime<Utc>) -> String {
    format!("line_items_export_{}_{}.csv", campaign_id, export_stamp(now))
}
