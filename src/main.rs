// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use campaignbook::api::{self, AppState};
use campaignbook::config::{self, Config};
use campaignbook::{cli, commands, db};

#[tokio::main]
async fn main() -> Result<()> {
    config::init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_flag = matches.get_one::<String>("db").map(String::as_str);
    let addr_flag = matches
        .subcommand_matches("serve")
        .and_then(|s| s.get_one::<String>("addr"))
        .map(String::as_str);
    let config = Config::resolve(db_flag, addr_flag)?;
    let mut conn = db::open_or_init(&config.db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path.display());
        }
        Some(("serve", _)) => {
            tracing::info!(db = %config.db_path.display(), "opening database");
            api::serve(AppState::new(conn, config)).await?;
        }
        Some(("user", sub)) => commands::users::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("campaign", sub)) => commands::campaigns::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
