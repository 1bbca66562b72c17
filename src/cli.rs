// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn opt(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn req(id: &'static str, help: &'static str) -> Arg {
    opt(id, help).required(true)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .value_name("ID")
        .required(true)
        .help("Record id")
}

fn flag(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).action(ArgAction::SetTrue).help(help)
}

fn output_flags() -> [Arg; 2] {
    [
        flag("json", "Print pretty JSON").conflicts_with("jsonl"),
        flag("jsonl", "Print one JSON object per line"),
    ]
}

fn ledger_filters() -> [Arg; 6] {
    [
        opt("period", "current|custom|all (default: all)")
            .value_parser(["current", "custom", "all"]),
        opt("from", "Custom range start YYYY-MM-DD"),
        opt("to", "Custom range end YYYY-MM-DD"),
        opt("client", "Client id"),
        opt("category", "Category name"),
        opt("type", "income|expense").value_parser(["income", "expense"]),
    ]
}

pub fn build_cli() -> Command {
    Command::new("clinicbook")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("client")
                .about("Manage clients")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Client name"))
                        .arg(opt("email", "Email address"))
                        .arg(opt("phone", "Phone number")),
                )
                .subcommand(Command::new("list").args(output_flags()))
                .subcommand(Command::new("show").arg(id_arg()).args(output_flags()))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("appt")
                .about("Schedule and track appointments")
                .subcommand(
                    Command::new("add")
                        .arg(req("client", "Client id"))
                        .arg(req("type", "Appointment type label"))
                        .arg(req("date", "YYYY-MM-DD"))
                        .arg(req("time", "HH:MM (24h)"))
                        .arg(req("duration", "Minutes").value_parser(value_parser!(u32)))
                        .arg(
                            opt("location", "online|in_person|home_visit")
                                .value_parser(["online", "in_person", "home_visit"])
                                .default_value("in_person"),
                        )
                        .arg(opt("status", "Initial status (default: scheduled)"))
                        .arg(opt("notes", "Free text notes")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(opt("date", "Exact date YYYY-MM-DD").conflicts_with_all(["from", "to"]))
                        .arg(opt("from", "Range start YYYY-MM-DD").requires("to"))
                        .arg(opt("to", "Range end YYYY-MM-DD").requires("from"))
                        .arg(opt("client", "Client id (most recent first)"))
                        .arg(opt("status", "Filter by status"))
                        .args(output_flags()),
                )
                .subcommand(Command::new("show").arg(id_arg()).args(output_flags()))
                .subcommand(
                    Command::new("update")
                        .arg(id_arg())
                        .arg(opt("type", "Appointment type label"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("time", "HH:MM (24h)"))
                        .arg(opt("duration", "Minutes").value_parser(value_parser!(u32)))
                        .arg(
                            opt("location", "online|in_person|home_visit")
                                .value_parser(["online", "in_person", "home_visit"]),
                        )
                        .arg(opt("notes", "Free text notes (empty clears)")),
                )
                .subcommand(
                    Command::new("status")
                        .arg(id_arg())
                        .arg(req("status", "scheduled|confirmed|completed|canceled|no_show")),
                )
                .subcommand(
                    Command::new("execute")
                        .about("Complete an appointment and optionally book its payment")
                        .arg(id_arg())
                        .arg(
                            opt("amount", "Payment amount (> 0 books a record)")
                                .allow_negative_numbers(true),
                        )
                        .arg(opt("description", "Ledger description"))
                        .arg(
                            opt("type", "income|expense")
                                .value_parser(["income", "expense"])
                                .default_value("income"),
                        )
                        .arg(opt("category", "Ledger category"))
                        .args(output_flags()),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("calendar")
                .about("Show a day, week or month grid")
                .arg(
                    opt("view", "day|week|month")
                        .value_parser(["day", "week", "month"])
                        .default_value("month"),
                )
                .arg(opt("date", "Anchor date YYYY-MM-DD (default: today)"))
                .arg(
                    opt("offset", "Move the anchor by N views")
                        .value_parser(value_parser!(i32))
                        .allow_negative_numbers(true),
                )
                .args(output_flags()),
        )
        .subcommand(
            Command::new("fin")
                .about("Financial records")
                .subcommand(
                    Command::new("add")
                        .arg(req("amount", "Positive amount"))
                        .arg(req("description", "Description"))
                        .arg(req("type", "income|expense").value_parser(["income", "expense"]))
                        .arg(opt("date", "YYYY-MM-DD (default: today)"))
                        .arg(opt("category", "Category name"))
                        .arg(opt("client", "Client id"))
                        .arg(opt("appointment", "Related appointment id")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg())
                        .arg(opt("amount", "New positive amount"))
                        .arg(opt("description", "Description"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("type", "income|expense").value_parser(["income", "expense"]))
                        .arg(opt("category", "Category name (empty clears)")),
                )
                .subcommand(
                    Command::new("list")
                        .args(ledger_filters())
                        .arg(opt("limit", "Max rows").value_parser(value_parser!(usize)))
                        .args(output_flags()),
                )
                .subcommand(Command::new("summary").args(ledger_filters()).args(output_flags()))
                .subcommand(
                    Command::new("breakdown")
                        .args(ledger_filters())
                        .arg(
                            opt("by", "category|month")
                                .value_parser(["category", "month"])
                                .default_value("category"),
                        )
                        .args(output_flags()),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("settings")
                .about("Persisted settings")
                .subcommand(Command::new("get").arg(req("key", "Setting key")))
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "Setting key"))
                        .arg(req("value", "Setting value")),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(Command::new("doctor").about("Check ledger and schedule consistency"))
}
