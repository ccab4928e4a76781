// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{DEFAULT_ITERATIONS, hash_password};
use crate::db;
use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let username = sub.get_one::<String>("username").unwrap().trim();
            let password = sub.get_one::<String>("password").unwrap();
            let id = add_user(conn, username, password, DEFAULT_ITERATIONS)?;
            println!("Added user '{}' (id {})", username, id);
        }
        Some(("deactivate", sub)) => {
            let username = sub.get_one::<String>("username").unwrap().trim();
            if !db::set_user_active(conn, username, false)? {
                return Err(anyhow!("User '{}' not found", username));
            }
            println!("Deactivated user '{}'", username);
        }
        _ => {}
    }
    Ok(())
}

pub fn add_user(conn: &Connection, username: &str, password: &str, iterations: u32) -> Result<i64> {
    if username.is_empty() || password.is_empty() {
        return Err(anyhow!("Username and password are required"));
    }
    let hash = hash_password(password, iterations);
    db::insert_user(conn, username, &hash, Utc::now())
}
