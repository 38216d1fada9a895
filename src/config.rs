use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::Duration;
use chrono_tz::Tz;

use crate::duration::parse_duration;

/// 1回の実行で使う設定。
///
/// コマンドライン引数から一度だけ組み立て、以降は参照で渡す。
#[derive(Debug)]
pub struct Config {
    pub api_token: String,
    pub api_url: String,
    pub verbosity: u8,
    pub log_file: Option<PathBuf>,
    pub strategy: Strategy,
}

/// 取得したtime entryに対して行う処理。
#[derive(Debug, clap::Subcommand)]
pub enum Strategy {
    /// Round your time entries in Toggl
    Round(RoundArgs),
    /// Summary of working days
    Summary(SummaryArgs),
    /// Aggregation of working time per month
    Aggregation(AggregationArgs),
}

impl Strategy {
    /// time entryを取得する期間。
    pub fn timeframe(&self) -> Duration {
        match self {
            Strategy::Round(args) => args.timeframe,
            Strategy::Summary(args) => args.timeframe,
            Strategy::Aggregation(args) => args.timeframe,
        }
    }
}

/// `round`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct RoundArgs {
    #[clap(long = "apply", help = "Apply rounding changes")]
    pub apply: bool,

    #[clap(
        long = "rounding",
        help = "Granularity durations are rounded up to",
        default_value = "5m",
        parse(try_from_str = parse_granularity),
    )]
    pub rounding: Duration,

    #[clap(
        long = "timeframe",
        help = "Time frame before now",
        default_value = "720h",
        parse(try_from_str = parse_timeframe),
    )]
    pub timeframe: Duration,
}

/// `summary`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct SummaryArgs {
    #[clap(
        long = "timeframe",
        help = "Time frame before now",
        default_value = "720h",
        parse(try_from_str = parse_timeframe),
    )]
    pub timeframe: Duration,

    #[clap(
        long = "lunchbreak",
        help = "Time taken for lunch",
        default_value = "1h",
        parse(try_from_str = parse_lunch_break),
    )]
    pub lunch_break: Duration,

    #[clap(
        long = "timezone",
        help = "IANA Timezone (https://en.wikipedia.org/wiki/List_of_tz_database_time_zones)",
        default_value = "Europe/Zurich",
        parse(try_from_str = parse_timezone),
    )]
    pub timezone: Tz,
}

/// `aggregation`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct AggregationArgs {
    #[clap(
        long = "timeframe",
        help = "Time frame before now",
        default_value = "720h",
        parse(try_from_str = parse_timeframe),
    )]
    pub timeframe: Duration,

    #[clap(
        long = "timezone",
        help = "IANA Timezone (https://en.wikipedia.org/wiki/List_of_tz_database_time_zones)",
        default_value = "Europe/Zurich",
        parse(try_from_str = parse_timezone),
    )]
    pub timezone: Tz,
}

/// 丸めの単位をパースする。0以下は受け付けない。
fn parse_granularity(s: &str) -> Result<Duration> {
    let granularity = parse_duration(s)?;
    if granularity <= Duration::zero() {
        bail!("Rounding must be positive: {}", s);
    }
    Ok(granularity)
}

/// 取得期間をパースする。負の値は受け付けない。
fn parse_timeframe(s: &str) -> Result<Duration> {
    let timeframe = parse_duration(s)?;
    if timeframe < Duration::zero() {
        bail!("Timeframe must not be negative: {}", s);
    }
    Ok(timeframe)
}

/// 昼休憩の時間をパースする。負の値と1日以上は受け付けない。
fn parse_lunch_break(s: &str) -> Result<Duration> {
    let lunch_break = parse_duration(s)?;
    if lunch_break < Duration::zero() || lunch_break >= Duration::days(1) {
        bail!("Lunch break must be between 0 and 24h: {}", s);
    }
    Ok(lunch_break)
}

/// IANAタイムゾーン名をパースする。
fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|err| anyhow!("Unknown timezone {}: {}", s, err))
}
