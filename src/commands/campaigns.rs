// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::pagination::{self, PageQuery};
use crate::utils::{fmt_decimal, maybe_print_json, pretty_table};
use crate::views::{CampaignDetail, CampaignSummary};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let query = PageQuery {
        page: sub.get_one::<String>("page").cloned(),
        page_size: sub.get_one::<String>("page-size").cloned(),
    };
    let data = query_page(conn, &query)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.created_at.clone(),
                    fmt_decimal(&c.potential_invoice_amount),
                    rate_cell(c.budget_fulfillment_rate),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Created", "Potential Invoice", "Fulfillment"],
                rows
            )
        );
    }
    Ok(())
}

/// One page of campaign summaries, using the same paging rules as the API.
pub fn query_page(conn: &Connection, query: &PageQuery) -> Result<Vec<CampaignSummary>> {
    let count = db::count_campaigns(conn)?;
    let window = pagination::resolve(query, count).map_err(|e| anyhow!("{}", e))?;
    let rows = db::list_campaigns_page(conn, window.offset(), window.size)?;
    let summaries = rows
        .iter()
        .map(CampaignSummary::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(summaries)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let detail = db::get_campaign_detail(conn, id)?
        .ok_or_else(|| anyhow!("Campaign {} not found", id))?;
    let view = CampaignDetail::try_from(&detail)?;
    if !maybe_print_json(sub.get_flag("json"), &view)? {
        println!(
            "{} (#{}) created {} | potential invoice {}",
            view.name,
            view.id,
            view.created_at,
            fmt_decimal(&view.potential_invoice_amount)
        );
        let rows = view
            .line_items
            .into_iter()
            .map(|li| {
                vec![
                    li.id.to_string(),
                    li.name,
                    li.booked_amount,
                    li.actual_amount,
                    li.adjustment_amount,
                    li.final_amount,
                    rate_cell(li.budget_fulfillment_rate),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Line Item", "Booked", "Actual", "Adjustment", "Final", "Fulfillment"],
                rows
            )
        );
    }
    Ok(())
}

fn rate_cell(rate: Option<i64>) -> String {
    rate.map(|r| format!("{}%", r)).unwrap_or_else(|| "-".to_string())
}
