// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::{db, export};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::fs::File;
use std::io::BufWriter;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("campaigns", sub)) => export_campaigns(conn, sub),
        Some(("line-items", sub)) => export_line_items(conn, sub),
        _ => Ok(()),
    }
}

fn create(out: &str) -> Result<BufWriter<File>> {
    let f = File::create(out).with_context(|| format!("Create {}", out))?;
    Ok(BufWriter::new(f))
}

fn export_campaigns(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap().trim();
    let campaigns = db::all_campaigns_with_items(conn)?;
    export::write_campaigns(create(out)?, &campaigns)?;
    println!("Exported {} campaigns to {}", campaigns.len(), out);
    Ok(())
}

fn export_line_items(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap().trim();
    let id = *sub.get_one::<i64>("campaign").unwrap();
    // look the campaign up before touching the output path
    let campaign = db::get_campaign(conn, id)?.ok_or_else(|| anyhow!("Campaign {} not found", id))?;
    let items = db::line_items_for_campaign(conn, id)?;
    export::write_line_items(create(out)?, &campaign, &items)?;
    println!("Exported {} line items of '{}' to {}", items.len(), campaign.name, out);
    Ok(())
}
