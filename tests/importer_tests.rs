// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use campaignbook::commands::importer::{self, ImportSummary};
use campaignbook::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

const ROWS: &str = r#"[
  {"id": 1, "campaign_id": 7, "campaign_name": "Spring", "line_item_name": "Banner",
   "booked_amount": 430706.687153275, "actual_amount": 401966.50036031, "adjustments": 1311.0086156229},
  {"id": 2, "campaign_id": 7, "campaign_name": "Spring", "line_item_name": "Video",
   "booked_amount": "100", "actual_amount": "90", "adjustments": "-0.000000000000000001"},
  {"id": 3, "campaign_id": 9, "campaign_name": "  Summer ", "line_item_name": "Audio",
   "booked_amount": 0, "actual_amount": 0, "adjustments": 0}
]"#;

#[test]
fn imports_rows_grouped_by_campaign() {
    let mut conn = db::open_in_memory().unwrap();
    let file = json_file(ROWS);

    let summary = importer::import_line_items(&mut conn, file.path()).unwrap();
    assert_eq!(
        summary,
        ImportSummary {
            campaigns: 2,
            line_items: 3
        }
    );
    assert_eq!(count(&conn, "campaigns"), 2);
    assert_eq!(count(&conn, "line_items"), 3);

    let spring = db::get_campaign_detail(&conn, 7).unwrap().unwrap();
    assert_eq!(spring.campaign.name, "Spring");
    assert_eq!(spring.line_items.len(), 2);
    let banner = spring
        .line_items
        .iter()
        .find(|li| li.name == "Banner")
        .unwrap();
    assert_eq!(
        banner.booked_amount,
        "430706.687153275".parse::<Decimal>().unwrap()
    );
    let video = spring.line_items.iter().find(|li| li.name == "Video").unwrap();
    assert_eq!(
        video.final_amount().unwrap(),
        "89.999999999999999999".parse::<Decimal>().unwrap()
    );

    let summer = db::get_campaign(&conn, 9).unwrap().unwrap();
    assert_eq!(summer.name, "Summer");
}

#[test]
fn bad_amount_rolls_back_whole_import() {
    let mut conn = db::open_in_memory().unwrap();
    let file = json_file(
        r#"[
      {"campaign_id": 1, "campaign_name": "A", "line_item_name": "ok",
       "booked_amount": 1, "actual_amount": 1, "adjustments": 0},
      {"campaign_id": 1, "campaign_name": "A", "line_item_name": "bad",
       "booked_amount": "lots", "actual_amount": 1, "adjustments": 0}
    ]"#,
    );
    let err = importer::import_line_items(&mut conn, file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Row 2"));
    assert_eq!(count(&conn, "campaigns"), 0);
    assert_eq!(count(&conn, "line_items"), 0);
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = db::open_in_memory().unwrap();
    let file = json_file(ROWS);
    let padded = format!("  {}  ", file.path().to_str().unwrap());

    let matches = cli::build_cli().get_matches_from(["campaignbook", "import", "line-items", &padded]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut conn, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(count(&conn, "line_items"), 3);
}

#[test]
fn amounts_past_exact_precision_are_rejected() {
    let mut conn = db::open_in_memory().unwrap();
    let file = json_file(
        r#"[
      {"campaign_id": 1, "campaign_name": "A", "line_item_name": "wide",
       "booked_amount": 1234567890.12345678901234567890, "actual_amount": 1, "adjustments": 0}
    ]"#,
    );
    let err = importer::import_line_items(&mut conn, file.path()).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("Row 1"), "{}", msg);
    assert!(msg.contains("digits in total"), "{}", msg);
    assert_eq!(count(&conn, "line_items"), 0);
}
