use std::collections::HashMap;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::time_entry::TimeEntry;

/// 集計の単位。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grouping {
    Day,
    Month,
}

impl Grouping {
    /// バケットのキーに使う書式。
    fn key_format(self) -> &'static str {
        match self {
            Grouping::Day => "%Y-%m-%d",
            Grouping::Month => "%Y-%m",
        }
    }
}

/// 1つのバケットの集計結果。
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate {
    /// バケット内で最も早い開始時刻。
    pub start: DateTime<Tz>,
    /// バケット内の`stop - start`の合計。
    pub duration: Duration,
}

/// time entryを日または月ごとに集計する。
///
/// バケットはtime entry自身のオフセットで開始時刻を書式化したキーで分け、
/// 合計時間と最小開始時刻は`timezone`に変換してから計算する。
/// 結果は開始時刻の昇順で、同じ開始時刻の順序は安定ソートに従う。
/// 終了していないtime entryは集計対象外とする。
pub fn aggregate(time_entries: &[TimeEntry], grouping: Grouping, timezone: &Tz) -> Vec<Aggregate> {
    let buckets: HashMap<String, Vec<&TimeEntry>> =
        time_entries
            .iter()
            .fold(HashMap::new(), |mut accumulate, entry| {
                if entry.is_running() {
                    return accumulate;
                }
                let key = entry.start.format(grouping.key_format()).to_string();
                accumulate.entry(key).or_default().push(entry);
                accumulate
            });

    let mut aggregates: Vec<Aggregate> = buckets
        .values()
        .filter_map(|entries| {
            entries.iter().fold(None, |current: Option<Aggregate>, entry| {
                let Some(stop) = entry.stop else {
                    return current;
                };
                let start = entry.start.with_timezone(timezone);
                let duration = stop.with_timezone(timezone) - start;

                Some(match current {
                    None => Aggregate { start, duration },
                    Some(current) => Aggregate {
                        start: current.start.min(start),
                        duration: current.duration + duration,
                    },
                })
            })
        })
        .collect();
    aggregates.sort_by_key(|aggregate| aggregate.start);

    aggregates
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use chrono_tz::{Europe::Zurich, Tz, UTC};
    use rstest::rstest;

    use super::{aggregate, Grouping};
    use crate::time_entry::fixtures::{finished_entry, running_entry};

    #[test]
    fn test_same_day_is_merged() {
        let entries = [
            finished_entry(2, "2024-03-01T14:00:00+00:00", "2024-03-01T15:30:00+00:00"),
            finished_entry(1, "2024-03-01T09:00:00+00:00", "2024-03-01T10:00:00+00:00"),
        ];

        let result = aggregate(&entries, Grouping::Day, &UTC);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].start, UTC.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        assert_eq!(result[0].duration, Duration::minutes(150));
    }

    #[test]
    fn test_sorted_by_start() {
        let entries = [
            finished_entry(1, "2024-03-03T08:00:00+00:00", "2024-03-03T09:00:00+00:00"),
            finished_entry(2, "2024-03-01T10:00:00+00:00", "2024-03-01T11:00:00+00:00"),
            finished_entry(3, "2024-03-02T07:00:00+00:00", "2024-03-02T07:30:00+00:00"),
            finished_entry(4, "2024-03-01T12:00:00+00:00", "2024-03-01T12:15:00+00:00"),
        ];

        let result = aggregate(&entries, Grouping::Day, &UTC);

        let starts: Vec<_> = result.iter().map(|aggregate| aggregate.start).collect();
        assert_eq!(
            starts,
            vec![
                UTC.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                UTC.with_ymd_and_hms(2024, 3, 2, 7, 0, 0).unwrap(),
                UTC.with_ymd_and_hms(2024, 3, 3, 8, 0, 0).unwrap(),
            ]
        );
        assert_eq!(result[0].duration, Duration::minutes(75));
    }

    #[rstest]
    #[case::day(Grouping::Day, 3)]
    #[case::month(Grouping::Month, 2)]
    fn test_grouping(#[case] grouping: Grouping, #[case] expected_len: usize) {
        let entries = [
            finished_entry(1, "2024-03-01T09:00:00+00:00", "2024-03-01T10:00:00+00:00"),
            finished_entry(2, "2024-03-15T09:00:00+00:00", "2024-03-15T11:00:00+00:00"),
            finished_entry(3, "2024-04-01T09:00:00+00:00", "2024-04-01T09:30:00+00:00"),
        ];

        let result = aggregate(&entries, grouping, &UTC);

        assert_eq!(result.len(), expected_len);
    }

    #[test]
    fn test_month_sums_all_days() {
        let entries = [
            finished_entry(1, "2024-03-01T09:00:00+00:00", "2024-03-01T10:00:00+00:00"),
            finished_entry(2, "2024-03-15T09:00:00+00:00", "2024-03-15T11:00:00+00:00"),
        ];

        let result = aggregate(&entries, Grouping::Month, &UTC);

        assert_eq!(result[0].duration, Duration::hours(3));
    }

    /// バケットはtime entry自身のオフセットで決まり、表示はタイムゾーンに変換される。
    #[test]
    fn test_bucket_in_entry_offset_and_display_in_timezone() {
        let entries = [
            finished_entry(1, "2024-03-01T23:30:00+00:00", "2024-03-02T00:30:00+00:00"),
            finished_entry(2, "2024-03-01T08:00:00+00:00", "2024-03-01T09:00:00+00:00"),
        ];
        let zurich: Tz = Zurich;

        let result = aggregate(&entries, Grouping::Day, &zurich);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].start, zurich.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        assert_eq!(result[0].duration, Duration::hours(2));
    }

    #[test]
    fn test_running_entry_is_ignored() {
        let entries = [
            finished_entry(1, "2024-03-01T09:00:00+00:00", "2024-03-01T10:00:00+00:00"),
            running_entry(2, "2024-03-01T07:00:00+00:00"),
            running_entry(3, "2024-03-02T07:00:00+00:00"),
        ];

        let result = aggregate(&entries, Grouping::Day, &UTC);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].start, UTC.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        assert_eq!(result[0].duration, Duration::hours(1));
    }

    #[test]
    fn test_no_entry() {
        assert!(aggregate(&[], Grouping::Day, &UTC).is_empty());
    }
}
