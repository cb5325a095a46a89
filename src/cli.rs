// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

use crate::projection::MAX_FORECAST_MONTHS;

fn opt(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn req(id: &'static str, help: &'static str) -> Arg {
    opt(id, help).required(true)
}

fn flag(id: &'static str, help: &'static str) -> Arg {
    opt(id, help).action(ArgAction::SetTrue)
}

fn with_json(cmd: Command) -> Command {
    cmd.arg(flag("json", "Print JSON"))
        .arg(flag("jsonl", "Print JSON lines").conflicts_with("json"))
}

fn today() -> Arg {
    opt("today", "Reference date YYYY-MM-DD (defaults to the local date)")
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand(
            Command::new("add")
                .about("Add an account")
                .arg(req("name", "Unique account name"))
                .arg(opt("balance", "Opening balance").default_value("0")),
        )
        .subcommand(with_json(Command::new("list").about("List accounts")))
        .subcommand(
            Command::new("rm")
                .about("Remove an account with no cards")
                .arg(req("name", "Account name")),
        )
}

fn card_cmd() -> Command {
    Command::new("card")
        .about("Manage payment cards")
        .subcommand(
            Command::new("add")
                .about("Add a card")
                .arg(req("name", "Unique card name"))
                .arg(req("account", "Account the card settles through"))
                .arg(
                    opt("method", "credit | debit | hybrid")
                        .default_value("credit"),
                )
                .arg(opt("due-day", "Statement due day of month (1-31)"))
                .arg(opt("closing-offset", "Days between statement closing and due date"))
                .arg(opt("limit", "Credit limit").default_value("0")),
        )
        .subcommand(with_json(Command::new("list").about("List cards")))
        .subcommand(
            Command::new("rm")
                .about("Remove a card")
                .arg(req("name", "Card name")),
        )
        .subcommand(with_json(
            Command::new("statement")
                .about("Show the open statement of every credit card")
                .arg(today()),
        ))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand(
            Command::new("add")
                .about("Add a category")
                .arg(req("name", "Unique category name"))
                .arg(opt("kind", "expense | income").default_value("expense")),
        )
        .subcommand(with_json(Command::new("list").about("List categories")))
        .subcommand(
            Command::new("rm")
                .about("Remove a category")
                .arg(req("name", "Category name")),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and inspect ledger entries")
        .subcommand(
            Command::new("add")
                .about("Record an expense or income")
                .arg(req("kind", "expense | income"))
                .arg(req("description", "What it was"))
                .arg(req("amount", "Non-negative amount"))
                .arg(opt("card", "Card for expenses"))
                .arg(opt("account", "Account for income"))
                .arg(opt("category", "Category name"))
                .arg(opt("method", "Purchase method for expenses: credit | debit"))
                .arg(flag("recurring", "Repeats every month"))
                .arg(opt("due-day", "Day of month a recurring entry falls on"))
                .arg(opt("installments", "Split an expense into N monthly installments"))
                .arg(opt(
                    "date",
                    "When it happened, YYYY-MM-DD[ HH:MM[:SS]] (defaults to now)",
                )),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List ledger entries")
                .arg(opt("month", "Only entries created in YYYY-MM"))
                .arg(opt("kind", "expense | income"))
                .arg(opt("card", "Only entries on this card"))
                .arg(opt("category", "Only entries in this category"))
                .arg(opt("limit", "Maximum rows").value_parser(value_parser!(usize))),
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete an entry and reverse its balance effect")
                .arg(req("id", "Entry id")),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Balance projections")
        .subcommand(with_json(
            Command::new("available")
                .about("Projected available balance for the current month")
                .arg(today()),
        ))
        .subcommand(with_json(
            Command::new("forecast")
                .about("Month-by-month forecast of recurring flows and installments")
                .arg(
                    opt("months", "Months ahead (defaults to the forecast_months setting)")
                        .value_parser(
                            value_parser!(u32).range(0..=MAX_FORECAST_MONTHS as i64),
                        ),
                )
                .arg(today()),
        ))
        .subcommand(with_json(
            Command::new("recurring")
                .about("Monthly total of recurring entries")
                .arg(req("kind", "expense | income"))
                .arg(opt("month", "YYYY-MM (defaults to the current month)"))
                .arg(flag(
                    "exclude-current",
                    "Skip entries created in that month",
                ))
                .arg(today()),
        ))
        .subcommand(with_json(
            Command::new("installments")
                .about("Installments due in a month")
                .arg(opt("month", "YYYY-MM (defaults to the current month)"))
                .arg(today()),
        ))
}

pub fn build_cli() -> Command {
    Command::new("cardcycle")
        .version(crate_version!())
        .about("Personal ledger with credit-card billing cycles and balance projections")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(account_cmd())
        .subcommand(card_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(report_cmd())
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Export the ledger")
                    .arg(opt("format", "csv | json").default_value("csv"))
                    .arg(req("out", "Output file")),
            ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check cards and ledger entries for problems")
                .arg(today()),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show").about("Print settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting (currency, forecast_months)")
                        .arg(req("key", "Setting name"))
                        .arg(req("value", "New value")),
                ),
        )
}
