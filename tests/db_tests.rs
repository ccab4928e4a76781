// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use campaignbook::auth;
use campaignbook::commands::users::add_user;
use campaignbook::db::{self, NewLineItem};
use chrono::{Duration, TimeZone, Utc};
use rusqlite::params;
use rust_decimal::Decimal;

fn item(campaign_id: i64, name: &str) -> NewLineItem {
    NewLineItem {
        campaign_id,
        name: name.into(),
        booked_amount: Decimal::from(100),
        actual_amount: Decimal::from(90),
        adjustment_amount: Decimal::ZERO,
    }
}

#[test]
fn deleting_campaign_cascades_to_line_items() {
    let conn = db::open_in_memory().unwrap();
    let now = Utc::now();
    let id = db::insert_campaign(&conn, "Doomed", now).unwrap();
    db::insert_line_item(&conn, &item(id, "a"), now).unwrap();
    db::insert_line_item(&conn, &item(id, "b"), now).unwrap();

    conn.execute("DELETE FROM campaigns WHERE id=?1", params![id])
        .unwrap();
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM line_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
}

#[test]
fn line_item_needs_existing_campaign() {
    let conn = db::open_in_memory().unwrap();
    assert!(db::insert_line_item(&conn, &item(77, "orphan"), Utc::now()).is_err());
}

#[test]
fn update_adjustment_touches_only_adjustment_and_updated_at() {
    let conn = db::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
    let id = db::insert_campaign(&conn, "C", t0).unwrap();
    let li = db::insert_line_item(&conn, &item(id, "x"), t0).unwrap();

    let t1 = t0 + Duration::hours(1);
    assert!(db::update_adjustment(&conn, li, Some(Decimal::new(-25, 1)), t1).unwrap());
    let after = db::get_line_item(&conn, li).unwrap().unwrap();
    assert_eq!(after.adjustment_amount, Decimal::new(-25, 1));
    assert_eq!(after.booked_amount, Decimal::from(100));
    assert_eq!(after.actual_amount, Decimal::from(90));
    assert_eq!(after.name, "x");
    assert_eq!(after.campaign_id, id);
    assert_eq!(after.created_at, t0);
    assert_eq!(after.updated_at, t1);

    assert!(!db::update_adjustment(&conn, 9999, Some(Decimal::ONE), t1).unwrap());
}

#[test]
fn update_without_adjustment_only_refreshes_updated_at() {
    let conn = db::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
    let id = db::insert_campaign(&conn, "C", t0).unwrap();
    let li = db::insert_line_item(&conn, &item(id, "x"), t0).unwrap();

    let t1 = t0 + Duration::minutes(3);
    assert!(db::update_adjustment(&conn, li, None, t1).unwrap());
    let after = db::get_line_item(&conn, li).unwrap().unwrap();
    assert_eq!(after.adjustment_amount, Decimal::ZERO);
    assert_eq!(after.updated_at, t1);
    assert_eq!(after.created_at, t0);
}

#[test]
fn campaign_page_loads_items_per_campaign() {
    let conn = db::open_in_memory().unwrap();
    let now = Utc::now();
    let ids: Vec<i64> = (0..5)
        .map(|i| db::insert_campaign(&conn, &format!("C{}", i), now).unwrap())
        .collect();
    db::insert_line_item(&conn, &item(ids[1], "one"), now).unwrap();
    db::insert_line_item(&conn, &item(ids[3], "two"), now).unwrap();
    db::insert_line_item(&conn, &item(ids[3], "three"), now).unwrap();

    let page = db::list_campaigns_page(&conn, 1, 3).unwrap();
    let shape: Vec<(i64, usize)> = page
        .iter()
        .map(|c| (c.campaign.id, c.line_items.len()))
        .collect();
    assert_eq!(shape, vec![(ids[1], 1), (ids[2], 0), (ids[3], 2)]);
    assert_eq!(db::count_campaigns(&conn).unwrap(), 5);
}

#[test]
fn sessions_expire_and_are_purged() {
    let conn = db::open_in_memory().unwrap();
    let uid = add_user(&conn, "ann", "pw", 1_000).unwrap();
    let now = Utc::now();
    let key = auth::start_session(&conn, uid, Duration::minutes(5), now).unwrap();

    let user = db::find_session_user(&conn, &key, now).unwrap().unwrap();
    assert_eq!(user.username, "ann");
    assert!(user.last_login.is_some());

    let later = now + Duration::minutes(6);
    assert!(db::find_session_user(&conn, &key, later).unwrap().is_none());
    assert_eq!(db::purge_expired_sessions(&conn, later).unwrap(), 1);
}

#[test]
fn authenticate_checks_password_and_active_flag() {
    let conn = db::open_in_memory().unwrap();
    add_user(&conn, "ann", "pw", 1_000).unwrap();
    assert!(auth::authenticate(&conn, "ann", "pw").unwrap().is_some());
    assert!(auth::authenticate(&conn, "ann", "nope").unwrap().is_none());
    assert!(auth::authenticate(&conn, "bob", "pw").unwrap().is_none());

    db::set_user_active(&conn, "ann", false).unwrap();
    assert!(auth::authenticate(&conn, "ann", "pw").unwrap().is_none());
}

#[test]
fn duplicate_username_is_rejected() {
    let conn = db::open_in_memory().unwrap();
    add_user(&conn, "ann", "pw", 1_000).unwrap();
    assert!(add_user(&conn, "ann", "other", 1_000).is_err());
    assert!(add_user(&conn, "", "pw", 1_000).is_err());
}
