// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn out_arg() -> Arg {
    Arg::new("out")
        .long("out")
        .required(true)
        .help("Output CSV path")
}

pub fn build_cli() -> Command {
    Command::new("campaignbook")
        .version(clap::crate_version!())
        .about("Campaign and line-item budgeting API")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite database path (env CAMPAIGNBOOK_DB)"),
        )
        .subcommand(Command::new("init").about("Create the database schema"))
        .subcommand(
            Command::new("serve").about("Run the HTTP API").arg(
                Arg::new("addr")
                    .long("addr")
                    .help("Bind address (env CAMPAIGNBOOK_ADDR, default 127.0.0.1:8000)"),
            ),
        )
        .subcommand(
            Command::new("user")
                .about("Manage API users")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("username").long("username").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                )
                .subcommand(
                    Command::new("deactivate")
                        .arg(Arg::new("username").long("username").required(true)),
                ),
        )
        .subcommand(
            Command::new("import").about("Load source data").subcommand(
                Command::new("line-items")
                    .about("JSON array of line item rows")
                    .arg(Arg::new("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("campaign")
                .about("Inspect campaigns")
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("page").long("page"))
                        .arg(Arg::new("page-size").long("page-size"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write CSV exports to disk")
                .subcommand(Command::new("campaigns").arg(out_arg()))
                .subcommand(
                    Command::new("line-items")
                        .arg(
                            Arg::new("campaign")
                                .long("campaign")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(out_arg()),
                ),
        )
}
