use std::{io, path::PathBuf, process};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::error;

mod aggregate;
mod config;
mod console;
mod datetime;
mod duration;
mod logger;
mod pipeline;
mod rounding;
mod time_entry;
mod toggl;

use config::{Config, Strategy};
use console::{ConsolePresenter, ConsoleTable};
use pipeline::Pipeline;
use toggl::{TogglClient, DEFAULT_API_URL};

/// Togglのtime entryを丸め、集計するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- round --rounding 15m
/// $ cargo run -- round --apply
/// $ cargo run -- summary --timezone Asia/Tokyo
/// $ cargo run -- aggregation
/// ```
#[derive(Debug, Parser)]
#[clap(version, about, arg_required_else_help = true)]
struct Args {
    #[clap(
        long = "api-token",
        alias = "api_token",
        env = "TOGGL_API_TOKEN",
        hide_env_values = true,
        help = "API Token for Toggl"
    )]
    api_token: String,

    #[clap(
        long = "api-url",
        env = "TOGGL_API_URL",
        default_value = DEFAULT_API_URL,
        hide = true
    )]
    api_url: String,

    #[clap(
        short = 'v',
        long = "verbose",
        global = true,
        parse(from_occurrences),
        help = "Increase log verbosity (-v: debug, -vv: trace)"
    )]
    verbose: u8,

    #[clap(
        long = "log-file",
        global = true,
        parse(from_os_str),
        help = "Also append logs to this file"
    )]
    log_file: Option<PathBuf>,

    #[clap(subcommand)]
    strategy: Option<Strategy>,
}

impl Args {
    /// 実行時の設定に変換する。サブコマンドが指定されていない場合は`None`を返す。
    fn into_config(self) -> Option<Config> {
        let strategy = self.strategy?;
        Some(Config {
            api_token: self.api_token,
            api_url: self.api_url,
            verbosity: self.verbose,
            log_file: self.log_file,
            strategy,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match Args::parse().into_config() {
        Some(config) => config,
        None => {
            Args::command()
                .print_help()
                .context("Failed to print help")?;
            return Ok(());
        }
    };

    logger::setup_logger(config.verbosity, config.log_file.as_deref())?;

    if let Err(err) = run(&config).await {
        error!("{:#}", err);
        process::exit(1);
    }

    Ok(())
}

/// time entryを取得して処理し、結果を標準出力に表示する。
async fn run(config: &Config) -> Result<()> {
    let client = TogglClient::new(&config.api_token).with_api_url(&config.api_url);
    let table = Pipeline::new(&client).run(&config.strategy).await?;

    let mut stdout = io::stdout();
    ConsoleTable::new(&mut stdout)
        .show_table(&table)
        .context("Failed to show result")?;

    Ok(())
}
