use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

mod balance;
mod balance_command;
mod calendar;
mod config;
mod console;
mod datetime;
mod entries_command;
mod error;
mod holidays;
mod logger;
mod obligation;
mod time_entry;
mod toggl;
mod worked;

use balance::format_balance;
use balance_command::{BalanceArgs, BalanceCommand};
use config::Config;
use console::{Console, ConsolePresenter};
use entries_command::{EntriesArgs, EntriesCommand};
use holidays::{CachedHolidaySource, GovUkBankHolidays};
use toggl::TogglClient;

/// Togglの記録から、開始日以降に働くべき時間に対する過不足を表示するCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- balance
/// $ cargo run -- balance --end 2018-02-06
/// $ cargo run -- entries --date 2018-02-06
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(short = 'v', long = "verbose", help = "Shows progress and counted entries")]
    verbose: bool,

    #[clap(
        short = 'c',
        long = "config",
        help = "Path to the config file (default: ~/.wweconfig.json)"
    )]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// 働くべき時間に対する過不足を表示する
    Balance(BalanceArgs),
    /// 1日分のタイムエントリーを表示する
    Entries(EntriesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose)?;

    let config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    let timezone = datetime::parse_offset(config.timezone.as_deref())?;
    let toggl_client = TogglClient::new(&config.toggl_token()?);

    let mut stdout = io::stdout();
    let mut presenter = Console::new(&mut stdout, timezone);
    match args.subcommand {
        SubCommands::Balance(balance) => {
            let holidays = CachedHolidaySource::new(GovUkBankHolidays::new());
            let report = BalanceCommand::new(&toggl_client, holidays, &config)
                .run(balance)
                .await?;
            info!(
                "{} ~ {}: owed {}, worked {}, {:?}",
                report.start,
                report.now,
                format_balance(report.owed),
                format_balance(report.worked),
                report.exclusions
            );
            presenter.show_balance(&report.balance)?;
        }
        SubCommands::Entries(entries) => {
            let time_entries = EntriesCommand::new(&toggl_client, &config.client.name, timezone)
                .run(entries)
                .await?;
            presenter.show_time_entries(&time_entries)?;
        }
    }

    Ok(())
}
