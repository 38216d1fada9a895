use anyhow::{Context, Result};
use log::info;

use crate::aggregate::{aggregate, Grouping};
use crate::config::{AggregationArgs, RoundArgs, Strategy, SummaryArgs};
use crate::console::Table;
use crate::datetime;
use crate::duration::format_duration;
use crate::rounding::plan_rounding;
use crate::time_entry::TimeEntry;
use crate::toggl::TogglRepository;

/// time entryを取得し、`Strategy`に応じて変換して表にする。
pub struct Pipeline<'a, T: TogglRepository> {
    toggl_client: &'a T,
}

impl<'a, T: TogglRepository> Pipeline<'a, T> {
    /// 新しい`Pipeline`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    pub fn new(toggl_client: &'a T) -> Self {
        Self { toggl_client }
    }

    /// 現在時刻から`timeframe`だけ遡った期間のtime entryを取得し、処理結果の表を返す。
    ///
    /// `round`で`apply`が指定されている場合は、丸めたtime entryを1件ずつ更新する。
    /// 更新に失敗した時点で処理を中断し、それ以降のtime entryは更新しない。
    pub async fn run(&self, strategy: &Strategy) -> Result<Table> {
        let (start_at, end_at) = datetime::lookback(strategy.timeframe())?;
        info!("Start at: {}, End at: {}", start_at, end_at);

        let time_entries = self
            .toggl_client
            .read_time_entries(&start_at, &end_at)
            .await
            .context("Failed to retrieve time entries")?;
        info!("Time entries retrieved successfully.");

        match strategy {
            Strategy::Round(round) => self.round(&time_entries, round).await,
            Strategy::Summary(summary) => summary_table(&time_entries, summary),
            Strategy::Aggregation(aggregation) => {
                Ok(aggregation_table(&time_entries, aggregation))
            }
        }
    }

    async fn round(&self, time_entries: &[TimeEntry], round: &RoundArgs) -> Result<Table> {
        let mut table = Table::new([
            "ID",
            "Description",
            "Start Time",
            "Old Duration",
            "New Duration",
        ]);

        for rounding in plan_rounding(time_entries, round.rounding) {
            let entry = &rounding.entry;
            let mut row = vec![
                entry.id.to_string(),
                entry.description.clone(),
                entry.start.format("%d %b %y %H:%M %z").to_string(),
                format_duration(rounding.old_duration),
            ];

            if round.apply {
                self.toggl_client
                    .update_duration(entry, rounding.new_duration)
                    .await
                    .with_context(|| format!("Failed to round time entry {}", entry.id))?;
                info!(
                    "Rounded time entry {} from {} to {}",
                    entry.id,
                    format_duration(rounding.old_duration),
                    format_duration(rounding.new_duration)
                );
                row.push(format_duration(rounding.new_duration));
            } else {
                row.push("-".to_string());
            }

            table.push_row(row);
        }

        Ok(table)
    }
}

/// 日毎の開始時刻、昼休憩を含めた終了時刻、作業時間の表を作る。
fn summary_table(time_entries: &[TimeEntry], summary: &SummaryArgs) -> Result<Table> {
    let end_header = format!("End Time ({} Lunch)", format_duration(summary.lunch_break));
    let mut table = Table::new(["Day", "Start Time", end_header.as_str(), "Duration"]);

    for day in aggregate(time_entries, Grouping::Day, &summary.timezone) {
        let end = day
            .start
            .checked_add_signed(day.duration)
            .and_then(|end| end.checked_add_signed(summary.lunch_break))
            .with_context(|| format!("End time of {} is out of range", day.start))?;
        table.push_row(vec![
            day.start.format("%a %d. %b %Y").to_string(),
            day.start.format("%H:%M").to_string(),
            end.format("%H:%M").to_string(),
            format_duration(day.duration),
        ]);
    }

    Ok(table)
}

/// 月毎の作業時間の表を作る。
fn aggregation_table(time_entries: &[TimeEntry], aggregation: &AggregationArgs) -> Table {
    let mut table = Table::new(["Month", "Duration"]);

    for month in aggregate(time_entries, Grouping::Month, &aggregation.timezone) {
        table.push_row(vec![
            month.start.format("%b %Y").to_string(),
            format_duration(month.duration),
        ]);
    }

    table
}
