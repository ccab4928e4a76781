// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use campaignbook::db::{self, NewLineItem};
use campaignbook::{cli, commands::exporter};
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use tempfile::tempdir;

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let id = db::insert_campaign(&conn, "Winter", t0).unwrap();
    for (name, booked, actual, adj) in [("A", "100", "80", "5"), ("B", "50.5", "50.5", "-0.5")] {
        db::insert_line_item(
            &conn,
            &NewLineItem {
                campaign_id: id,
                name: name.into(),
                booked_amount: booked.parse().unwrap(),
                actual_amount: actual.parse().unwrap(),
                adjustment_amount: adj.parse().unwrap(),
            },
            t0,
        )
        .unwrap();
    }
    db::insert_campaign(&conn, "Empty", t0).unwrap();
    (conn, id)
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["campaignbook", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("export", export_m)) => exporter::handle(conn, export_m),
        _ => panic!("no export subcommand"),
    }
}

#[test]
fn export_campaigns_writes_totals() {
    let (conn, _) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("campaigns.csv");
    let out_str = out.to_string_lossy().to_string();

    run(&conn, &["campaigns", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "1,Winter,2025-01-02T03:04:05.000000+00:00,135,2,150.5,130.5,4.5"
    );
    assert_eq!(lines[2], "2,Empty,2025-01-02T03:04:05.000000+00:00,0,0,0,0,0");
}

#[test]
fn export_line_items_writes_final_amounts() {
    let (conn, id) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("items.csv");
    let out_str = out.to_string_lossy().to_string();

    run(&conn, &["line-items", "--campaign", &id.to_string(), "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Name,Booked Amount,Actual Amount,Adjustment Amount,Final Amount,Campaign ID,Campaign Name"
    );
    assert_eq!(lines[1], "1,A,100,80,5,85,1,Winter");
    assert_eq!(lines[2], "2,B,50.5,50.5,-0.5,50,1,Winter");
}

#[test]
fn export_line_items_rejects_unknown_campaign() {
    let (conn, _) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("missing.csv");
    let out_str = out.to_string_lossy().to_string();

    assert!(run(&conn, &["line-items", "--campaign", "404", "--out", &out_str]).is_err());
    assert!(!out.exists());
}
